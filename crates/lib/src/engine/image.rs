//! Build, push and resolve the digest of the invocation image.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::consts::{DOCKERFILE, IMAGE_BUNDLE_DIR};
use crate::engine::archive::archive_context_async;
use crate::engine::progress::{DrainError, drain};
use crate::engine::{ContainerEngine, EngineError, ImageBuildOptions, RegistryAuth};

/// Registry responses that mean the push was rejected for lack of permission.
const DENIED_PREFIX: &str = "denied";

#[derive(Debug, Error)]
pub enum ImageError {
  #[error("failed to archive build context")]
  Archive(#[source] io::Error),

  #[error("failed to build invocation image: {0}")]
  Build(String),

  #[error("failed to push invocation image: {0}")]
  Push(String),

  #[error("docker push authentication failed: {0}")]
  Auth(String),

  #[error("failed to resolve digest of pushed image")]
  Digest(#[source] EngineError),

  #[error("failed to write progress")]
  Progress(#[source] io::Error),

  #[error("cancelled")]
  Cancelled,
}

/// What to build and where to push it.
#[derive(Debug, Clone)]
pub struct ImageRequest<'a> {
  pub context_dir: &'a Path,
  pub image: &'a str,
  pub auth: Option<RegistryAuth>,
}

/// Build options for the invocation image.
///
/// `BUNDLE_DIR` is the directory the bundle is unpacked to inside the image.
pub fn build_options(image: &str) -> ImageBuildOptions {
  ImageBuildOptions {
    tags: vec![image.to_string()],
    dockerfile: DOCKERFILE.to_string(),
    build_args: BTreeMap::from([("BUNDLE_DIR".to_string(), IMAGE_BUNDLE_DIR.to_string())]),
  }
}

/// Build the context into `request.image`, push it and return the registry digest.
///
/// Both progress streams are drained in full before the next step starts.
pub async fn build_and_push(
  engine: &dyn ContainerEngine,
  request: &ImageRequest<'_>,
  progress: &mut (dyn Write + Send),
  cancel: &CancellationToken,
) -> Result<String, ImageError> {
  let context = tokio::select! {
    _ = cancel.cancelled() => return Err(ImageError::Cancelled),
    archived = archive_context_async(request.context_dir.to_path_buf()) => archived.map_err(ImageError::Archive)?,
  };

  info!(image = request.image, "building invocation image");
  let frames = drain(engine.build(context, &build_options(request.image)), progress, cancel)
    .await
    .map_err(|e| match e {
      DrainError::Cancelled => ImageError::Cancelled,
      DrainError::Progress(e) => ImageError::Progress(e),
      other => ImageError::Build(other.engine_message().unwrap_or_else(|| other.to_string())),
    })?;
  debug!(frames, "image build finished");

  info!(image = request.image, "pushing invocation image");
  drain(engine.push(request.image, request.auth.clone()), progress, cancel)
    .await
    .map_err(|e| match e {
      DrainError::Cancelled => ImageError::Cancelled,
      DrainError::Progress(e) => ImageError::Progress(e),
      other => {
        let message = other.engine_message().unwrap_or_else(|| other.to_string());
        if message.starts_with(DENIED_PREFIX) {
          ImageError::Auth(message)
        } else {
          ImageError::Push(message)
        }
      }
    })?;

  let digest = tokio::select! {
    _ = cancel.cancelled() => return Err(ImageError::Cancelled),
    digest = engine.inspect_digest(request.image, request.auth.clone()) => digest.map_err(ImageError::Digest)?,
  };
  info!(image = request.image, digest, "resolved image digest");
  Ok(digest)
}
