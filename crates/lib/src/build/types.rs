use std::path::PathBuf;

use thiserror::Error;

use crate::bundle::BundleError;
use crate::dockerfile::ScriptError;
use crate::engine::{EngineError, ImageError};
use crate::manifest::ManifestError;
use crate::mixin::MixinError;
use crate::reference::ReferenceError;
use crate::stage::StageError;
use crate::stamp::StampError;

/// Everything the pipeline needs to know about one build.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
  pub manifest_path: PathBuf,
  /// Directory archived as the build context. `Dockerfile` and `bundle.json` are written here.
  pub context_dir: PathBuf,
  /// Version of the building tool, recorded in the stamp.
  pub version: String,
  /// Commit of the building tool, recorded in the stamp.
  pub commit: String,
  /// Pass `--debug` to mixins.
  pub debug: bool,
  /// Where to look for docker `config.json`. `None` pushes anonymously.
  pub docker_config_dir: Option<PathBuf>,
}

/// Result of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
  pub bundle_path: PathBuf,
  /// Digest-pinned invocation image reference.
  pub image: String,
  pub digest: String,
  pub manifest_digest: String,
}

#[derive(Debug, Error)]
pub enum BuildError {
  #[error("invalid manifest")]
  Configuration(#[from] ManifestError),

  #[error("unable to generate Dockerfile")]
  ScriptGeneration(#[source] ScriptError),

  #[error("unable to stage build context")]
  Staging(#[from] StageError),

  #[error("unable to build invocation image: {0}")]
  ImageBuild(String),

  #[error("unable to push invocation image: {0}")]
  ImagePush(String),

  #[error("docker push authentication failed: {0}")]
  ImageAuth(String),

  #[error("unable to resolve digest of invocation image")]
  DigestResolution(#[source] EngineError),

  #[error("unable to parse image reference {image}")]
  ReferenceParse {
    image: String,
    #[source]
    source: ReferenceError,
  },

  #[error("unable to stamp bundle")]
  Stamp(#[from] StampError),

  #[error("unable to write bundle")]
  BundleWrite(#[source] BundleError),

  #[error("build cancelled")]
  Cancelled,
}

impl From<ScriptError> for BuildError {
  fn from(err: ScriptError) -> Self {
    match err {
      ScriptError::Mixin {
        source: MixinError::Cancelled { .. },
        ..
      } => BuildError::Cancelled,
      other => BuildError::ScriptGeneration(other),
    }
  }
}

impl From<ImageError> for BuildError {
  fn from(err: ImageError) -> Self {
    match err {
      ImageError::Archive(e) => BuildError::ImageBuild(format!("failed to archive build context: {e}")),
      ImageError::Build(msg) => BuildError::ImageBuild(msg),
      ImageError::Push(msg) => BuildError::ImagePush(msg),
      ImageError::Auth(msg) => BuildError::ImageAuth(msg),
      ImageError::Digest(e) => BuildError::DigestResolution(e),
      ImageError::Progress(e) => BuildError::ImageBuild(format!("failed to write progress: {e}")),
      ImageError::Cancelled => BuildError::Cancelled,
    }
  }
}

impl From<BundleError> for BuildError {
  fn from(err: BundleError) -> Self {
    match err {
      BundleError::Reference { image, source } => BuildError::ReferenceParse { image, source },
      BundleError::Stamp(e) => BuildError::Stamp(e),
      other => BuildError::BundleWrite(other),
    }
  }
}
