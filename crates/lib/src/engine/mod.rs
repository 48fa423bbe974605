//! Container engine access.
//!
//! The pipeline treats the container engine as an opaque service behind the
//! [`ContainerEngine`] trait: build a context into an image, push it, and ask the
//! registry for the pushed digest. Build and push report progress as a stream of
//! [`ProgressFrame`]s that the caller must drain.
//!
//! - [`docker`] - [`ContainerEngine`] over the local docker daemon
//! - [`image`] - The build → push → inspect sequence
//! - [`progress`] - Frame rendering and draining
//! - [`archive`] - Tar build contexts
//! - [`auth`] - Registry credentials from the docker client config

pub mod archive;
pub mod auth;
pub mod docker;
pub mod image;
pub mod progress;

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use thiserror::Error;

pub use docker::DockerEngine;
pub use image::{ImageError, ImageRequest, build_and_push};

/// Errors surfaced by an engine implementation.
#[derive(Debug, Error)]
pub enum EngineError {
  #[error("could not connect to the container engine: {0}")]
  Connect(String),

  /// An error reported inside a progress stream.
  #[error("{0}")]
  Stream(String),

  #[error("container engine request failed: {0}")]
  Request(String),
}

/// Options for a single image build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageBuildOptions {
  pub tags: Vec<String>,
  /// Dockerfile name, relative to the root of the build context.
  pub dockerfile: String,
  pub build_args: BTreeMap<String, String>,
}

/// One message of build or push progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressFrame {
  pub id: Option<String>,
  pub status: Option<String>,
  pub progress: Option<String>,
  /// Raw build output (already newline-terminated by the engine).
  pub stream: Option<String>,
  /// Set when the engine reports a failure in an otherwise successful response.
  pub error: Option<String>,
}

impl ProgressFrame {
  pub fn status(status: impl Into<String>) -> Self {
    Self {
      status: Some(status.into()),
      ..Default::default()
    }
  }

  pub fn stream(text: impl Into<String>) -> Self {
    Self {
      stream: Some(text.into()),
      ..Default::default()
    }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self {
      error: Some(message.into()),
      ..Default::default()
    }
  }
}

/// Credentials for one registry.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RegistryAuth {
  pub server_address: String,
  pub username: Option<String>,
  pub password: Option<String>,
  pub identity_token: Option<String>,
}

impl std::fmt::Debug for RegistryAuth {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RegistryAuth")
      .field("server_address", &self.server_address)
      .field("username", &self.username)
      .field("password", &self.password.as_ref().map(|_| "<redacted>"))
      .field("identity_token", &self.identity_token.as_ref().map(|_| "<redacted>"))
      .finish()
  }
}

pub type FrameStream<'a> = BoxStream<'a, Result<ProgressFrame, EngineError>>;

/// The operations the pipeline needs from a container engine.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
  /// Build `context` (a tar archive) into an image.
  fn build<'a>(&'a self, context: Vec<u8>, options: &ImageBuildOptions) -> FrameStream<'a>;

  /// Push a previously built image to its registry.
  fn push<'a>(&'a self, image: &'a str, auth: Option<RegistryAuth>) -> FrameStream<'a>;

  /// Resolve the content digest of a pushed image from its registry.
  async fn inspect_digest(&self, image: &str, auth: Option<RegistryAuth>) -> Result<String, EngineError>;
}
