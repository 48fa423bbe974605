use std::io::Write;
use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::build::{BuildError, BuildOptions, BuildOutcome};
use crate::bundle::{assemble, write_bundle};
use crate::consts::MANIFEST_CONTEXT_PATH;
use crate::dockerfile::{Composer, write_dockerfile};
use crate::engine::auth::resolve_auth;
use crate::engine::{ContainerEngine, ImageRequest, build_and_push};
use crate::manifest::LoadedManifest;
use crate::reference::Reference;
use crate::resolve::Resolver;
use crate::stage::{StageError, stage};
use crate::stamp::Stamp;

/// Run the whole pipeline for one manifest.
///
/// Progress meant for the user (generated Dockerfile, mixin diagnostics, engine
/// output) goes to `progress`. Cancelling `cancel` aborts whichever external call
/// is in flight; the descriptor is never written after cancellation.
pub async fn build(
  options: &BuildOptions,
  engine: &dyn ContainerEngine,
  resolver: &dyn Resolver,
  progress: &mut (dyn Write + Send),
  cancel: &CancellationToken,
) -> Result<BuildOutcome, BuildError> {
  let loaded = LoadedManifest::load(&options.manifest_path)?;
  let manifest = &loaded.manifest;
  let context_dir = options.context_dir.as_path();
  info!(name = %manifest.name, image = %manifest.image, context = %context_dir.display(), "starting build");

  let reference = Reference::parse(&manifest.image).map_err(|source| BuildError::ReferenceParse {
    image: manifest.image.clone(),
    source,
  })?;
  check_cancelled(cancel)?;

  stage(manifest, resolver, context_dir, &mut *progress)?;
  place_manifest(&loaded, context_dir)?;
  check_cancelled(cancel)?;

  let base_dir = options
    .manifest_path
    .parent()
    .filter(|dir| !dir.as_os_str().is_empty())
    .unwrap_or(context_dir);
  let lines = Composer::new(manifest, base_dir, resolver)
    .with_debug(options.debug)
    .compose(progress, cancel)
    .await?;
  write_dockerfile(context_dir, &lines)?;
  check_cancelled(cancel)?;

  let auth = options
    .docker_config_dir
    .as_deref()
    .and_then(|dir| resolve_auth(dir, reference.registry_host()));
  let request = ImageRequest {
    context_dir,
    image: &manifest.image,
    auth,
  };
  let digest = build_and_push(engine, &request, progress, cancel).await?;

  let stamp = Stamp::generate(
    &loaded.bytes,
    &options.version,
    &options.commit,
    manifest.mixins.iter().cloned(),
  );
  let bundle = assemble(manifest, &digest, &stamp)?;

  check_cancelled(cancel)?;
  let bundle_path = write_bundle(context_dir, &bundle)?;
  info!(path = %bundle_path.display(), digest, "bundle written");

  let image = bundle
    .invocation_images
    .first()
    .map(|i| i.image.clone())
    .unwrap_or_default();

  Ok(BuildOutcome {
    bundle_path,
    image,
    digest,
    manifest_digest: stamp.manifest_digest,
  })
}

fn check_cancelled(cancel: &CancellationToken) -> Result<(), BuildError> {
  if cancel.is_cancelled() {
    warn!("build cancelled");
    return Err(BuildError::Cancelled);
  }
  Ok(())
}

/// Stage the bytes that were loaded as the image's manifest.
///
/// The project's own manifest file is never touched, even when the build was
/// started from a different manifest.
fn place_manifest(loaded: &LoadedManifest, context_dir: &Path) -> Result<(), StageError> {
  let target = context_dir.join(MANIFEST_CONTEXT_PATH);
  if let Some(parent) = target.parent() {
    std::fs::create_dir_all(parent).map_err(|source| StageError::Io {
      path: parent.to_path_buf(),
      source,
    })?;
  }
  debug!(from = %loaded.path.display(), to = %target.display(), "staging manifest");
  std::fs::write(&target, &loaded.bytes).map_err(|source| StageError::Io { path: target, source })
}
