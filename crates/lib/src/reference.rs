//! Container image references.
//!
//! Parses references of the form `[domain[:port]/]path[:tag][@algorithm:hex]` and
//! rewrites them into digest-pinned `name@digest` form. Names are kept exactly as
//! written (no `docker.io/library/` normalization), so `registry/app:v1` pins to
//! `registry/app@sha256:...`.

use std::fmt;

use thiserror::Error;

const NAME_TOTAL_LENGTH_MAX: usize = 255;
const TAG_LENGTH_MAX: usize = 128;
const DIGEST_HEX_MIN: usize = 32;

/// Registry used when a reference carries no domain.
pub const DEFAULT_REGISTRY: &str = "docker.io";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
  #[error("image reference is empty")]
  Empty,

  #[error("repository name must not be more than 255 characters: {0}")]
  NameTooLong(String),

  #[error("invalid reference format: repository name '{0}' must be lowercase alphanumerics separated by '.', '_', '__' or '-'")]
  InvalidName(String),

  #[error("invalid reference format: invalid domain '{0}'")]
  InvalidDomain(String),

  #[error("invalid reference format: invalid tag '{0}'")]
  InvalidTag(String),

  #[error("invalid reference format: invalid digest '{0}'")]
  InvalidDigest(String),
}

/// A parsed image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
  name: String,
  domain: Option<String>,
  tag: Option<String>,
  digest: Option<String>,
}

impl Reference {
  pub fn parse(s: &str) -> Result<Self, ReferenceError> {
    if s.is_empty() {
      return Err(ReferenceError::Empty);
    }

    let (rest, digest) = match s.split_once('@') {
      Some((rest, digest)) => {
        if !is_digest(digest) {
          return Err(ReferenceError::InvalidDigest(digest.to_string()));
        }
        (rest, Some(digest.to_string()))
      }
      None => (s, None),
    };

    // A ':' after the last '/' separates the tag; earlier ones belong to a port.
    let last_slash = rest.rfind('/').map(|i| i + 1).unwrap_or(0);
    let (name, tag) = match rest[last_slash..].rfind(':') {
      Some(i) => {
        let split = last_slash + i;
        let tag = &rest[split + 1..];
        if !is_tag(tag) {
          return Err(ReferenceError::InvalidTag(tag.to_string()));
        }
        (&rest[..split], Some(tag.to_string()))
      }
      None => (rest, None),
    };

    if name.is_empty() {
      return Err(ReferenceError::InvalidName(name.to_string()));
    }
    if name.len() > NAME_TOTAL_LENGTH_MAX {
      return Err(ReferenceError::NameTooLong(name.to_string()));
    }

    let domain = split_domain(name)?;
    let path = match &domain {
      Some(d) => &name[d.len() + 1..],
      None => name,
    };
    if path.is_empty() || !path.split('/').all(is_path_component) {
      return Err(ReferenceError::InvalidName(name.to_string()));
    }

    Ok(Self {
      name: name.to_string(),
      domain,
      tag,
      digest,
    })
  }

  /// Repository name as written, including any domain.
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn domain(&self) -> Option<&str> {
    self.domain.as_deref()
  }

  pub fn tag(&self) -> Option<&str> {
    self.tag.as_deref()
  }

  pub fn digest(&self) -> Option<&str> {
    self.digest.as_deref()
  }

  /// Registry host the image is pushed to.
  pub fn registry_host(&self) -> &str {
    self.domain.as_deref().unwrap_or(DEFAULT_REGISTRY)
  }
}

impl fmt::Display for Reference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name)?;
    if let Some(tag) = &self.tag {
      write!(f, ":{}", tag)?;
    }
    if let Some(digest) = &self.digest {
      write!(f, "@{}", digest)?;
    }
    Ok(())
  }
}

/// Rewrite `image` to `name@digest`, dropping any tag or previous digest.
pub fn pin(image: &str, digest: &str) -> Result<String, ReferenceError> {
  if digest.is_empty() {
    return Err(ReferenceError::InvalidDigest(digest.to_string()));
  }
  let reference = Reference::parse(image)?;
  Ok(format!("{}@{}", reference.name(), digest))
}

/// The first component is a domain when it looks like a host: it has a '.', a port,
/// is `localhost`, or is not a valid lowercase path component.
fn split_domain(name: &str) -> Result<Option<String>, ReferenceError> {
  let Some((first, _)) = name.split_once('/') else {
    return Ok(None);
  };

  let looks_like_host = first.contains('.') || first.contains(':') || first == "localhost" || !is_path_component(first);
  if !looks_like_host {
    return Ok(None);
  }
  if !is_domain(first) {
    return Err(ReferenceError::InvalidDomain(first.to_string()));
  }
  Ok(Some(first.to_string()))
}

fn is_domain(s: &str) -> bool {
  let (host, port) = match s.rsplit_once(':') {
    Some((host, port)) => (host, Some(port)),
    None => (s, None),
  };

  if let Some(port) = port
    && (port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()))
  {
    return false;
  }

  !host.is_empty() && host.split('.').all(is_domain_component)
}

fn is_domain_component(s: &str) -> bool {
  let bytes = s.as_bytes();
  match (bytes.first(), bytes.last()) {
    (Some(first), Some(last)) => {
      first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
    }
    _ => false,
  }
}

/// `[a-z0-9]+` runs joined by `.`, `_`, `__` or one or more `-`.
fn is_path_component(s: &str) -> bool {
  let is_alnum = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
  let bytes = s.as_bytes();
  let mut i = 0;

  loop {
    let start = i;
    while i < bytes.len() && is_alnum(bytes[i]) {
      i += 1;
    }
    if i == start {
      return false;
    }
    if i == bytes.len() {
      return true;
    }

    let sep_start = i;
    while i < bytes.len() && !is_alnum(bytes[i]) {
      i += 1;
    }
    let sep = &s[sep_start..i];
    let valid = matches!(sep, "." | "_" | "__") || sep.bytes().all(|b| b == b'-');
    if !valid {
      return false;
    }
  }
}

fn is_tag(s: &str) -> bool {
  let word = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
  let bytes = s.as_bytes();
  match bytes.split_first() {
    Some((first, rest)) => {
      s.len() <= TAG_LENGTH_MAX && word(*first) && rest.iter().all(|b| word(*b) || *b == b'.' || *b == b'-')
    }
    None => false,
  }
}

fn is_digest(s: &str) -> bool {
  let Some((algorithm, hex)) = s.split_once(':') else {
    return false;
  };

  let algorithm_ok = algorithm
    .as_bytes()
    .first()
    .is_some_and(|b| b.is_ascii_alphabetic())
    && algorithm
      .bytes()
      .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'+' | b'.'));

  algorithm_ok && hex.len() >= DIGEST_HEX_MIN && hex.bytes().all(|b| b.is_ascii_hexdigit())
}
