//! Provenance stamp.
//!
//! Every bundle carries a stamp in its custom metadata recording what it was built
//! from: a digest over the manifest and the building tool's version and commit, the
//! manifest itself (base64), and the set of mixins used. The digest lets a later
//! invocation tell whether a bundle is stale relative to the manifest on disk.
//!
//! ```json
//! "custom": {
//!   "sh.packwright/v1": {
//!     "manifestDigest": "62686a97...",
//!     "manifest": "bmFtZTogaGVsbG8=",
//!     "mixins": { "exec": {} },
//!     "version": "v0.3.0",
//!     "commit": "abc123"
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::bundle::Bundle;
use crate::consts::CUSTOM_STAMP_KEY;

#[derive(Debug, Error)]
pub enum StampError {
  #[error("no packwright stamp found in the bundle (missing custom key '{0}')")]
  Missing(String),

  #[error("could not unmarshal the packwright stamp: {0}")]
  Shape(String),

  #[error("no packwright manifest was embedded in the bundle")]
  NoManifest,

  #[error("could not base64 decode the manifest in the stamp")]
  InvalidEncoding(#[source] base64::DecodeError),

  #[error("could not serialize the packwright stamp")]
  Serialize(#[source] serde_json::Error),
}

/// Per-mixin metadata recorded in the stamp. Empty for now.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixinRecord {}

/// Provenance record embedded in a bundle.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stamp {
  #[serde(default)]
  pub manifest_digest: String,
  /// Base64 of the raw manifest bytes.
  #[serde(rename = "manifest", default, skip_serializing_if = "String::is_empty")]
  pub encoded_manifest: String,
  #[serde(default)]
  pub mixins: BTreeMap<String, MixinRecord>,
  #[serde(default)]
  pub version: String,
  #[serde(default)]
  pub commit: String,
}

/// SHA-256 over the manifest bytes, the tool version and the tool commit, hex encoded.
///
/// Fields are NUL-separated so that moving bytes between them changes the digest.
pub fn compute_digest(manifest: &[u8], version: &str, commit: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(manifest);
  hasher.update([0u8]);
  hasher.update(version.as_bytes());
  hasher.update([0u8]);
  hasher.update(commit.as_bytes());
  hex::encode(hasher.finalize())
}

impl Stamp {
  /// Build the stamp for a manifest and the mixins it uses.
  pub fn generate<I, S>(manifest: &[u8], version: &str, commit: &str, mixins: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      manifest_digest: compute_digest(manifest, version, commit),
      encoded_manifest: STANDARD.encode(manifest),
      mixins: mixins.into_iter().map(|m| (m.into(), MixinRecord::default())).collect(),
      version: version.to_string(),
      commit: commit.to_string(),
    }
  }

  /// Store the stamp in the bundle's custom metadata, replacing any previous one.
  pub fn embed(&self, bundle: &mut Bundle) -> Result<(), StampError> {
    let value = serde_json::to_value(self).map_err(StampError::Serialize)?;
    bundle.custom.insert(CUSTOM_STAMP_KEY.to_string(), value);
    Ok(())
  }

  /// Read the stamp back out of a bundle.
  pub fn load(bundle: &Bundle) -> Result<Self, StampError> {
    let value = bundle
      .custom
      .get(CUSTOM_STAMP_KEY)
      .ok_or_else(|| StampError::Missing(CUSTOM_STAMP_KEY.to_string()))?;

    if !value.is_object() {
      return Err(StampError::Shape(format!("expected an object, found {}", json_kind(value))));
    }

    serde_json::from_value(value.clone()).map_err(|e| StampError::Shape(e.to_string()))
  }

  /// The raw manifest bytes that were embedded at build time.
  pub fn decode_manifest(&self) -> Result<Vec<u8>, StampError> {
    if self.encoded_manifest.is_empty() {
      return Err(StampError::NoManifest);
    }
    STANDARD
      .decode(&self.encoded_manifest)
      .map_err(StampError::InvalidEncoding)
  }

  /// Whether `manifest` is what this stamp was generated from, under the same tool build.
  pub fn verify(&self, manifest: &[u8]) -> bool {
    compute_digest(manifest, &self.version, &self.commit) == self.manifest_digest
  }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
  match value {
    serde_json::Value::Null => "null",
    serde_json::Value::Bool(_) => "a boolean",
    serde_json::Value::Number(_) => "a number",
    serde_json::Value::String(_) => "a string",
    serde_json::Value::Array(_) => "a list",
    serde_json::Value::Object(_) => "an object",
  }
}
