//! [`ContainerEngine`] over the local docker daemon.

use std::collections::HashMap;

use async_trait::async_trait;
use bollard::Docker;
use bollard::auth::DockerCredentials;
use bollard::image::{BuildImageOptions, PushImageOptions};
use bollard::models::{BuildInfo, PushImageInfo};
use futures_util::{StreamExt, stream};
use tracing::debug;

use crate::engine::{ContainerEngine, EngineError, FrameStream, ImageBuildOptions, ProgressFrame, RegistryAuth};
use crate::reference::Reference;

pub struct DockerEngine {
  docker: Docker,
}

impl DockerEngine {
  /// Connect using `DOCKER_HOST` or the platform's default socket.
  pub fn connect() -> Result<Self, EngineError> {
    let docker = Docker::connect_with_local_defaults().map_err(|e| EngineError::Connect(e.to_string()))?;
    Ok(Self { docker })
  }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
  fn build<'a>(&'a self, context: Vec<u8>, options: &ImageBuildOptions) -> FrameStream<'a> {
    let build_args: HashMap<String, String> = options.build_args.clone().into_iter().collect();
    let opts = BuildImageOptions {
      dockerfile: options.dockerfile.clone(),
      t: options.tags.first().cloned().unwrap_or_default(),
      buildargs: build_args,
      rm: true,
      ..Default::default()
    };
    debug!(tag = %opts.t, dockerfile = %opts.dockerfile, context = context.len(), "starting image build");

    self
      .docker
      .build_image(opts, None, Some(context.into()))
      .map(|item| item.map(build_frame).map_err(engine_error))
      .boxed()
  }

  fn push<'a>(&'a self, image: &'a str, auth: Option<RegistryAuth>) -> FrameStream<'a> {
    let reference = match Reference::parse(image) {
      Ok(reference) => reference,
      Err(e) => return stream::once(async move { Err(EngineError::Request(e.to_string())) }).boxed(),
    };
    let name = reference.name().to_string();
    let tag = reference.tag().unwrap_or("latest").to_string();
    debug!(name, tag, authenticated = auth.is_some(), "starting image push");

    self
      .docker
      .push_image(&name, Some(PushImageOptions { tag }), auth.map(credentials))
      .map(|item| item.map(push_frame).map_err(engine_error))
      .boxed()
  }

  async fn inspect_digest(&self, image: &str, auth: Option<RegistryAuth>) -> Result<String, EngineError> {
    let inspect = self
      .docker
      .inspect_registry_image(image, auth.map(credentials))
      .await
      .map_err(engine_error)?;

    inspect
      .descriptor
      .digest
      .filter(|d| !d.is_empty())
      .ok_or_else(|| EngineError::Request(format!("registry returned no digest for {image}")))
  }
}

fn build_frame(info: BuildInfo) -> ProgressFrame {
  let error = info.error.or_else(|| info.error_detail.and_then(|d| d.message));
  ProgressFrame {
    id: info.id,
    status: info.status,
    progress: info.progress,
    stream: info.stream,
    error,
  }
}

fn push_frame(info: PushImageInfo) -> ProgressFrame {
  ProgressFrame {
    id: None,
    status: info.status,
    progress: info.progress,
    stream: None,
    error: info.error,
  }
}

fn credentials(auth: RegistryAuth) -> DockerCredentials {
  DockerCredentials {
    username: auth.username,
    password: auth.password,
    serveraddress: Some(auth.server_address),
    identitytoken: auth.identity_token,
    ..Default::default()
  }
}

fn engine_error(error: bollard::errors::Error) -> EngineError {
  use bollard::errors::Error;

  match error {
    Error::DockerStreamError { error } => EngineError::Stream(error),
    Error::DockerResponseServerError { message, .. } => EngineError::Request(message),
    other => EngineError::Request(other.to_string()),
  }
}
