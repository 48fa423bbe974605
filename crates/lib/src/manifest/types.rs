//! Manifest types for packwright.
//!
//! The manifest is read once per build from `packwright.yaml`. Its raw bytes are
//! kept alongside the parsed form because the provenance stamp digests and embeds
//! exactly what the user wrote, not a re-serialization.
//!
//! # Ordering
//!
//! `mixins` and `dependencies` are ordered lists. Their order controls the order of
//! the generated build script and of the staged build context, so it is preserved
//! exactly as written.
//!
//! # Example
//!
//! ```yaml
//! name: hello
//! version: 0.1.0
//! description: An example bundle
//! image: registry.example.com/hello:v0.1.0
//! mixins:
//!   - exec
//! parameters:
//!   - name: greeting
//!     type: string
//!     default: hi
//! credentials:
//!   - name: kubeconfig
//!     path: /root/.kube/config
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("manifest not found: {0}")]
  NotFound(PathBuf),

  #[error("failed to read manifest {path}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse manifest {path}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("invalid manifest: {0}")]
  Invalid(String),
}

/// The parsed application manifest.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub version: String,
  /// Image reference the invocation image is tagged and pushed as.
  pub image: String,
  /// Optional user-supplied base Dockerfile, relative to the build directory.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub dockerfile: Option<String>,
  #[serde(default)]
  pub mixins: Vec<String>,
  #[serde(default)]
  pub dependencies: Vec<Dependency>,
  #[serde(default)]
  pub parameters: Vec<ParameterDefinition>,
  #[serde(default)]
  pub credentials: Vec<CredentialDefinition>,
}

/// Another bundle this bundle depends on. Its contents are copied into the image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
  pub name: String,
}

/// A parameter the bundle accepts at execution time.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
  pub name: String,
  #[serde(rename = "type")]
  pub data_type: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default: Option<serde_json::Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub allowed_values: Option<Vec<serde_json::Value>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min_value: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_value: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min_length: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_length: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub destination: Option<Location>,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub description: String,
}

/// A credential the bundle needs, and where it is placed inside the invocation image.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialDefinition {
  pub name: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub env: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub path: String,
}

/// Where a value is delivered inside the invocation image.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub env: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub path: String,
}

impl Manifest {
  /// Parse a manifest from raw YAML bytes.
  pub fn from_slice(bytes: &[u8], path: &Path) -> Result<Self, ManifestError> {
    serde_yaml::from_slice(bytes).map_err(|source| ManifestError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Check the invariants the build pipeline relies on.
  pub fn validate(&self) -> Result<(), ManifestError> {
    if self.name.trim().is_empty() {
      return Err(ManifestError::Invalid("name is required".to_string()));
    }
    if self.image.trim().is_empty() {
      return Err(ManifestError::Invalid("image is required".to_string()));
    }

    let mut seen = HashSet::new();
    for param in &self.parameters {
      if !seen.insert(param.name.as_str()) {
        return Err(ManifestError::Invalid(format!("duplicate parameter: {}", param.name)));
      }
    }

    let mut seen = HashSet::new();
    for cred in &self.credentials {
      if !seen.insert(cred.name.as_str()) {
        return Err(ManifestError::Invalid(format!("duplicate credential: {}", cred.name)));
      }
    }

    Ok(())
  }
}

/// A manifest together with the exact bytes it was parsed from.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
  pub path: PathBuf,
  pub bytes: Vec<u8>,
  pub manifest: Manifest,
}

impl LoadedManifest {
  /// Read, parse and validate the manifest at `path`.
  pub fn load(path: &Path) -> Result<Self, ManifestError> {
    if !path.exists() {
      return Err(ManifestError::NotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|source| ManifestError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let manifest = Manifest::from_slice(&bytes, path)?;
    manifest.validate()?;

    Ok(Self {
      path: path.to_path_buf(),
      bytes,
      manifest,
    })
  }
}
