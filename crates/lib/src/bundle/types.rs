//! Bundle descriptor wire types.
//!
//! Maps are [`BTreeMap`]s so the serialized descriptor is byte-for-byte stable for
//! the same inputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::BUNDLE_SCHEMA_VERSION;

/// The serialized bundle descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
  pub schema_version: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub description: String,
  pub version: String,
  #[serde(default)]
  pub invocation_images: Vec<InvocationImage>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub parameters: BTreeMap<String, ParameterDefinition>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub credentials: BTreeMap<String, Location>,
  /// Free-form extension metadata, keyed by a namespaced key.
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub custom: BTreeMap<String, serde_json::Value>,
}

impl Default for Bundle {
  fn default() -> Self {
    Self {
      schema_version: BUNDLE_SCHEMA_VERSION.to_string(),
      name: String::new(),
      description: String::new(),
      version: String::new(),
      invocation_images: Vec::new(),
      parameters: BTreeMap::new(),
      credentials: BTreeMap::new(),
      custom: BTreeMap::new(),
    }
  }
}

/// The image that runs the bundle's actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationImage {
  /// Digest-pinned reference, `name@digest`.
  pub image: String,
  pub image_type: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub digest: String,
}

/// A parameter as the execution engine sees it.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
  #[serde(rename = "type")]
  pub data_type: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default_value: Option<serde_json::Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub allowed_values: Option<Vec<serde_json::Value>>,
  #[serde(default)]
  pub required: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min_value: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_value: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min_length: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_length: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub metadata: Option<ParameterMetadata>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub destination: Option<Location>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterMetadata {
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub description: String,
}

/// Where a parameter or credential is delivered inside the invocation image.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub path: String,
  #[serde(rename = "env", default, skip_serializing_if = "String::is_empty")]
  pub environment_variable: String,
}
