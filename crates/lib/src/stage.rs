//! Build context staging.
//!
//! Before the build context is archived, everything the invocation image needs is
//! copied under `cnab/app/` in the build directory:
//!
//! ```text
//! cnab/app/
//!   bundles/<dependency>/...   one tree per manifest dependency
//!   packwright-runtime         the runtime executable
//!   mixins/<mixin>/...         one tree per manifest mixin
//!   run                        entrypoint (written if the project has none)
//! ```
//!
//! Any missing source aborts the whole build; nothing is skipped.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::consts::{BUNDLES_CONTEXT_DIR, MIXINS_CONTEXT_DIR, RUN_SCRIPT_CONTEXT_PATH, RUNTIME_CONTEXT_PATH};
use crate::dockerfile::templates::RUN_SCRIPT;
use crate::manifest::Manifest;
use crate::resolve::{ResolveError, Resolver};
use crate::util::fs::{CopyError, copy_dir, copy_file, set_executable};

#[derive(Debug, Error)]
pub enum StageError {
  #[error("could not resolve {kind} '{name}'")]
  Resolve {
    kind: &'static str,
    name: String,
    #[source]
    source: ResolveError,
  },

  #[error("could not copy {kind} '{name}' into the build context")]
  Copy {
    kind: &'static str,
    name: String,
    #[source]
    source: CopyError,
  },

  #[error("could not prepare {path}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Copy dependencies, the runtime and mixins into `context_dir`, in that order.
pub fn stage(
  manifest: &Manifest,
  resolver: &dyn Resolver,
  context_dir: &Path,
  progress: &mut dyn Write,
) -> Result<(), StageError> {
  let progress_err = |source| StageError::Io {
    path: context_dir.to_path_buf(),
    source,
  };

  writeln!(progress, "Copying dependencies ===>").map_err(progress_err)?;
  for dep in &manifest.dependencies {
    writeln!(progress, "Copying bundle dependency {} ===>", dep.name).map_err(progress_err)?;
    let dir = resolver.bundle_dir(&dep.name).map_err(|source| StageError::Resolve {
      kind: "dependency",
      name: dep.name.clone(),
      source,
    })?;
    copy_tree("dependency", &dep.name, &dir, &context_dir.join(BUNDLES_CONTEXT_DIR))?;
  }

  writeln!(progress, "Copying packwright runtime ===>").map_err(progress_err)?;
  stage_runtime(resolver, context_dir)?;

  writeln!(progress, "Copying mixins ===>").map_err(progress_err)?;
  for mixin in &manifest.mixins {
    writeln!(progress, "Copying mixin {} ===>", mixin).map_err(progress_err)?;
    let dir = resolver.mixin_dir(mixin).map_err(|source| StageError::Resolve {
      kind: "mixin",
      name: mixin.clone(),
      source,
    })?;
    copy_tree("mixin", mixin, &dir, &context_dir.join(MIXINS_CONTEXT_DIR))?;
  }

  ensure_run_script(context_dir)?;

  info!(
    dependencies = manifest.dependencies.len(),
    mixins = manifest.mixins.len(),
    "build context staged"
  );
  Ok(())
}

fn copy_tree(kind: &'static str, name: &str, src: &Path, dest_parent: &Path) -> Result<(), StageError> {
  let files = copy_dir(src, dest_parent, true).map_err(|source| StageError::Copy {
    kind,
    name: name.to_string(),
    source,
  })?;
  debug!(kind, name, files, "copied into build context");
  Ok(())
}

fn stage_runtime(resolver: &dyn Resolver, context_dir: &Path) -> Result<(), StageError> {
  let runtime = resolver.runtime_path().map_err(|source| StageError::Resolve {
    kind: "runtime",
    name: "packwright-runtime".to_string(),
    source,
  })?;
  let dest = context_dir.join(RUNTIME_CONTEXT_PATH);

  copy_file(&runtime, &dest).map_err(|source| StageError::Copy {
    kind: "runtime",
    name: "packwright-runtime".to_string(),
    source,
  })?;
  set_executable(&dest).map_err(|source| StageError::Io { path: dest, source })
}

/// Write the default entrypoint unless the project already ships one.
fn ensure_run_script(context_dir: &Path) -> Result<(), StageError> {
  let path = context_dir.join(RUN_SCRIPT_CONTEXT_PATH);
  if path.exists() {
    return Ok(());
  }

  debug!(path = %path.display(), "writing default run script");
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).map_err(|source| StageError::Io {
      path: parent.to_path_buf(),
      source,
    })?;
  }
  std::fs::write(&path, RUN_SCRIPT).map_err(|source| StageError::Io {
    path: path.clone(),
    source,
  })?;
  set_executable(&path).map_err(|source| StageError::Io { path, source })
}
