//! Registry credentials from the docker client configuration.
//!
//! Reads `config.json` from the docker config directory and looks up the `auths`
//! entry for a registry host. Credential helpers are not consulted; an image whose
//! registry is only reachable through a helper is pushed anonymously and the
//! registry's `denied` response is reported to the user.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::engine::RegistryAuth;
use crate::reference::DEFAULT_REGISTRY;

/// Key docker uses for Docker Hub credentials.
pub const DOCKER_HUB_AUTH_KEY: &str = "https://index.docker.io/v1/";

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Default, Deserialize)]
struct ClientConfig {
  #[serde(default)]
  auths: BTreeMap<String, AuthEntry>,
  #[serde(default, rename = "credsStore")]
  creds_store: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthEntry {
  #[serde(default)]
  auth: Option<String>,
  #[serde(default)]
  username: Option<String>,
  #[serde(default)]
  password: Option<String>,
  #[serde(default, rename = "identitytoken")]
  identity_token: Option<String>,
}

/// Look up credentials for `registry` in `<config_dir>/config.json`.
///
/// A missing or unreadable configuration yields anonymous access.
pub fn resolve_auth(config_dir: &Path, registry: &str) -> Option<RegistryAuth> {
  let path = config_dir.join(CONFIG_FILE);
  let content = match fs::read_to_string(&path) {
    Ok(content) => content,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      debug!(path = %path.display(), "no docker client config, using anonymous access");
      return None;
    }
    Err(e) => {
      warn!(path = %path.display(), error = %e, "failed to read docker client config");
      return None;
    }
  };

  let config: ClientConfig = match serde_json::from_str(&content) {
    Ok(config) => config,
    Err(e) => {
      warn!(path = %path.display(), error = %e, "failed to parse docker client config");
      return None;
    }
  };

  let wanted = normalize_host(registry);
  let Some((key, entry)) = config.auths.iter().find(|(key, _)| normalize_host(key) == wanted) else {
    if let Some(store) = &config.creds_store {
      debug!(registry, store, "credentials store configured but not consulted");
    }
    return None;
  };

  let (username, password) = match (&entry.auth, &entry.username) {
    (Some(encoded), _) if !encoded.is_empty() => match decode_auth(encoded) {
      Some(pair) => (Some(pair.0), Some(pair.1)),
      None => {
        warn!(registry = key.as_str(), "ignoring malformed auth entry in docker client config");
        return None;
      }
    },
    (_, Some(user)) => (Some(user.clone()), entry.password.clone()),
    _ => (None, None),
  };

  if username.is_none() && entry.identity_token.is_none() {
    return None;
  }

  debug!(registry, "using credentials from docker client config");
  Some(RegistryAuth {
    server_address: key.clone(),
    username,
    password,
    identity_token: entry.identity_token.clone(),
  })
}

/// Decode a base64 `user:password` pair.
fn decode_auth(encoded: &str) -> Option<(String, String)> {
  let bytes = STANDARD.decode(encoded.trim()).ok()?;
  let text = String::from_utf8(bytes).ok()?;
  let (user, password) = text.split_once(':')?;
  Some((user.to_string(), password.to_string()))
}

/// Reduce an auth key or registry name to a bare host, folding Docker Hub aliases together.
fn normalize_host(key: &str) -> String {
  let without_scheme = key
    .strip_prefix("https://")
    .or_else(|| key.strip_prefix("http://"))
    .unwrap_or(key);
  let host = without_scheme.split('/').next().unwrap_or(without_scheme).to_lowercase();
  match host.as_str() {
    "index.docker.io" | "registry-1.docker.io" | "registry.hub.docker.com" => DEFAULT_REGISTRY.to_string(),
    _ => host,
  }
}
