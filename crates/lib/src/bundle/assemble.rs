//! Bundle assembly.
//!
//! Converts the manifest's parameters and credentials into descriptor form, pins
//! the invocation image to its digest, attaches the stamp, and writes the result.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::bundle::{Bundle, InvocationImage, Location, ParameterDefinition, ParameterMetadata};
use crate::consts::{BUNDLE_FILE, DEBUG_PARAMETER, DEBUG_PARAMETER_ENV, IMAGE_TYPE};
use crate::manifest::{self, CredentialDefinition, Manifest};
use crate::reference::{self, ReferenceError};
use crate::stamp::{Stamp, StampError};

#[derive(Debug, Error)]
pub enum BundleError {
  #[error("unable to pin invocation image '{image}'")]
  Reference {
    image: String,
    #[source]
    source: ReferenceError,
  },

  #[error(transparent)]
  Stamp(#[from] StampError),

  #[error("error writing {path}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("error reading {path}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("error serializing bundle")]
  Serialize(#[source] serde_json::Error),
}

/// Parameters every bundle carries in addition to the manifest's own.
pub fn default_parameters() -> Vec<manifest::ParameterDefinition> {
  vec![manifest::ParameterDefinition {
    name: DEBUG_PARAMETER.to_string(),
    data_type: "bool".to_string(),
    default: Some(serde_json::Value::Bool(false)),
    destination: Some(manifest::Location {
      env: DEBUG_PARAMETER_ENV.to_string(),
      path: String::new(),
    }),
    description: "Print debug information from packwright when executing the bundle".to_string(),
    ..Default::default()
  }]
}

/// Convert manifest parameters (plus the defaults) into descriptor parameters.
///
/// A parameter without a default is required. A parameter without a destination is
/// delivered through an environment variable named after it, upper-cased.
pub fn generate_parameters(params: &[manifest::ParameterDefinition]) -> BTreeMap<String, ParameterDefinition> {
  let defaults = default_parameters();
  params
    .iter()
    .chain(defaults.iter())
    .map(|param| {
      debug!(parameter = %param.name, "generating parameter definition");
      (param.name.clone(), convert_parameter(param))
    })
    .collect()
}

fn convert_parameter(param: &manifest::ParameterDefinition) -> ParameterDefinition {
  let destination = match &param.destination {
    Some(dest) => Location {
      path: dest.path.clone(),
      environment_variable: dest.env.clone(),
    },
    None => Location {
      path: String::new(),
      environment_variable: param.name.to_uppercase(),
    },
  };

  let metadata = (!param.description.is_empty()).then(|| ParameterMetadata {
    description: param.description.clone(),
  });

  ParameterDefinition {
    data_type: param.data_type.clone(),
    default_value: param.default.clone(),
    allowed_values: param.allowed_values.clone(),
    required: param.default.is_none(),
    min_value: param.min_value,
    max_value: param.max_value,
    min_length: param.min_length,
    max_length: param.max_length,
    metadata,
    destination: Some(destination),
  }
}

/// Convert manifest credentials into descriptor locations, field for field.
pub fn generate_credentials(creds: &[CredentialDefinition]) -> BTreeMap<String, Location> {
  creds
    .iter()
    .map(|cred| {
      debug!(credential = %cred.name, "generating credential");
      (
        cred.name.clone(),
        Location {
          path: cred.path.clone(),
          environment_variable: cred.env.clone(),
        },
      )
    })
    .collect()
}

/// Build the complete descriptor for a pushed image.
pub fn assemble(manifest: &Manifest, digest: &str, stamp: &Stamp) -> Result<Bundle, BundleError> {
  let image = reference::pin(&manifest.image, digest).map_err(|source| BundleError::Reference {
    image: manifest.image.clone(),
    source,
  })?;

  let mut bundle = Bundle {
    name: manifest.name.clone(),
    description: manifest.description.clone(),
    version: manifest.version.clone(),
    invocation_images: vec![InvocationImage {
      image,
      image_type: IMAGE_TYPE.to_string(),
      digest: digest.to_string(),
    }],
    parameters: generate_parameters(&manifest.parameters),
    credentials: generate_credentials(&manifest.credentials),
    ..Default::default()
  };
  stamp.embed(&mut bundle)?;

  Ok(bundle)
}

/// Write `bundle.json` into `dir`.
///
/// The descriptor is written to a temporary file in the same directory and renamed
/// into place, so readers never observe a partial document.
pub fn write_bundle(dir: &Path, bundle: &Bundle) -> Result<PathBuf, BundleError> {
  let path = dir.join(BUNDLE_FILE);
  let write_err = |source| BundleError::Write {
    path: path.clone(),
    source,
  };

  let mut file = NamedTempFile::new_in(dir).map_err(write_err)?;
  serde_json::to_writer_pretty(&mut file, bundle).map_err(BundleError::Serialize)?;
  file.write_all(b"\n").map_err(write_err)?;
  file.flush().map_err(write_err)?;
  // Temp files are created 0600; the descriptor is a published artifact.
  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    file
      .as_file()
      .set_permissions(std::fs::Permissions::from_mode(0o644))
      .map_err(write_err)?;
  }
  file.persist(&path).map_err(|e| write_err(e.error))?;

  Ok(path)
}

/// Read a descriptor back from disk.
pub fn read_bundle(path: &Path) -> Result<Bundle, BundleError> {
  let content = std::fs::read(path).map_err(|source| BundleError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  serde_json::from_slice(&content).map_err(BundleError::Serialize)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::consts::CUSTOM_STAMP_KEY;
  use serde_json::json;
  use tempfile::TempDir;

  fn param(name: &str) -> manifest::ParameterDefinition {
    manifest::ParameterDefinition {
      name: name.to_string(),
      data_type: "string".to_string(),
      ..Default::default()
    }
  }

  fn manifest() -> Manifest {
    Manifest {
      name: "hello".to_string(),
      description: "An example".to_string(),
      version: "0.1.0".to_string(),
      image: "registry/app:v1".to_string(),
      mixins: vec!["exec".to_string()],
      ..Default::default()
    }
  }

  #[test]
  fn parameter_without_default_is_required() {
    let params = generate_parameters(&[param("token")]);
    assert!(params["token"].required);
  }

  #[test]
  fn parameter_with_default_is_optional() {
    let mut p = param("greeting");
    p.default = Some(json!("hi"));

    let params = generate_parameters(&[p]);
    assert!(!params["greeting"].required);
    assert_eq!(params["greeting"].default_value, Some(json!("hi")));
  }

  #[test]
  fn destination_defaults_to_uppercased_env() {
    let params = generate_parameters(&[param("db_name")]);
    assert_eq!(
      params["db_name"].destination,
      Some(Location {
        path: String::new(),
        environment_variable: "DB_NAME".to_string(),
      })
    );
  }

  #[test]
  fn explicit_destination_is_kept() {
    let mut p = param("config");
    p.destination = Some(manifest::Location {
      env: String::new(),
      path: "/cnab/app/config.yaml".to_string(),
    });

    let params = generate_parameters(&[p]);
    assert_eq!(
      params["config"].destination,
      Some(Location {
        path: "/cnab/app/config.yaml".to_string(),
        environment_variable: String::new(),
      })
    );
  }

  #[test]
  fn constraints_are_copied_verbatim() {
    let mut p = param("replicas");
    p.data_type = "int".to_string();
    p.allowed_values = Some(vec![json!(1), json!(3)]);
    p.min_value = Some(1);
    p.max_value = Some(3);
    p.min_length = Some(0);
    p.max_length = Some(10);
    p.description = "How many".to_string();

    let converted = &generate_parameters(&[p])["replicas"];
    assert_eq!(converted.data_type, "int");
    assert_eq!(converted.allowed_values, Some(vec![json!(1), json!(3)]));
    assert_eq!((converted.min_value, converted.max_value), (Some(1), Some(3)));
    assert_eq!((converted.min_length, converted.max_length), (Some(0), Some(10)));
    assert_eq!(converted.metadata.as_ref().unwrap().description, "How many");
  }

  #[test]
  fn debug_parameter_is_always_injected() {
    let params = generate_parameters(&[]);
    let debug = &params[DEBUG_PARAMETER];

    assert_eq!(debug.data_type, "bool");
    assert_eq!(debug.default_value, Some(json!(false)));
    assert!(!debug.required);
    assert_eq!(debug.destination.as_ref().unwrap().environment_variable, DEBUG_PARAMETER_ENV);
  }

  #[test]
  fn credentials_are_copied_without_defaulting() {
    let creds = generate_credentials(&[
      CredentialDefinition {
        name: "kubeconfig".to_string(),
        env: String::new(),
        path: "/root/.kube/config".to_string(),
      },
      CredentialDefinition {
        name: "token".to_string(),
        env: "API_TOKEN".to_string(),
        path: String::new(),
      },
    ]);

    assert_eq!(creds["kubeconfig"].path, "/root/.kube/config");
    assert_eq!(creds["kubeconfig"].environment_variable, "");
    assert_eq!(creds["token"].environment_variable, "API_TOKEN");
    assert_eq!(creds["token"].path, "");
  }

  #[test]
  fn assemble_pins_image_and_embeds_stamp() {
    let m = manifest();
    let stamp = Stamp::generate(b"name: hello", "v1", "abc", &m.mixins);

    let bundle = assemble(&m, "sha256:deadbeef", &stamp).unwrap();

    assert_eq!(bundle.name, "hello");
    assert_eq!(bundle.description, "An example");
    assert_eq!(bundle.version, "0.1.0");
    assert_eq!(bundle.invocation_images.len(), 1);
    assert_eq!(bundle.invocation_images[0].image, "registry/app@sha256:deadbeef");
    assert_eq!(bundle.invocation_images[0].image_type, IMAGE_TYPE);
    assert_eq!(bundle.invocation_images[0].digest, "sha256:deadbeef");
    assert!(bundle.custom.contains_key(CUSTOM_STAMP_KEY));
    assert_eq!(Stamp::load(&bundle).unwrap(), stamp);
  }

  #[test]
  fn assemble_rejects_malformed_image() {
    let mut m = manifest();
    m.image = "Registry/App:v1".to_string();

    let err = assemble(&m, "sha256:deadbeef", &Stamp::default()).unwrap_err();
    assert!(matches!(err, BundleError::Reference { .. }));
  }

  #[test]
  fn write_bundle_overwrites_and_reads_back() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(BUNDLE_FILE), "{ stale garbage that is longer than anything ").unwrap();

    let m = manifest();
    let bundle = assemble(&m, "sha256:deadbeef", &Stamp::generate(b"x", "", "", &m.mixins)).unwrap();
    let path = write_bundle(dir.path(), &bundle).unwrap();

    assert_eq!(path, dir.path().join(BUNDLE_FILE));
    assert_eq!(read_bundle(&path).unwrap(), bundle);

    let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(leftovers.len(), 1, "temp file should have been renamed into place");
  }

  #[cfg(unix)]
  #[test]
  fn written_bundle_is_world_readable() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let m = manifest();
    let bundle = assemble(&m, "sha256:deadbeef", &Stamp::generate(b"x", "", "", &m.mixins)).unwrap();
    let path = write_bundle(dir.path(), &bundle).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
  }
}
