//! Dockerfile composition.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::consts::{DOCKERFILE, MIXIN_BUILD_COMMAND};
use crate::dockerfile::templates::DEFAULT_DOCKERFILE;
use crate::manifest::Manifest;
use crate::mixin::{MixinError, MixinIo, MixinRunner};
use crate::resolve::{ResolveError, Resolver};

/// Errors raised while generating the Dockerfile.
#[derive(Debug, Error)]
pub enum ScriptError {
  #[error("the Dockerfile specified in the manifest doesn't exist: {0}")]
  BaseNotFound(PathBuf),

  #[error("error reading base Dockerfile {path}")]
  ReadBase {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("error generating Dockerfile content for mixin '{mixin}'")]
  ResolveMixin {
    mixin: String,
    #[source]
    source: ResolveError,
  },

  #[error("error generating Dockerfile content for mixin '{mixin}'")]
  Mixin {
    mixin: String,
    #[source]
    source: MixinError,
  },

  #[error("couldn't write the Dockerfile {path}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("error writing Dockerfile progress")]
  Progress(#[source] io::Error),
}

/// Generates the Dockerfile for one manifest.
pub struct Composer<'a> {
  pub manifest: &'a Manifest,
  /// Directory that a custom `dockerfile` path in the manifest is relative to.
  pub base_dir: &'a Path,
  pub resolver: &'a dyn Resolver,
  /// Pass `--debug` to every mixin.
  pub debug: bool,
}

impl<'a> Composer<'a> {
  pub fn new(manifest: &'a Manifest, base_dir: &'a Path, resolver: &'a dyn Resolver) -> Self {
    Self {
      manifest,
      base_dir,
      resolver,
      debug: false,
    }
  }

  pub fn with_debug(mut self, debug: bool) -> Self {
    self.debug = debug;
    self
  }

  /// Produce every line of the Dockerfile.
  ///
  /// Each section is echoed to `progress` as soon as it is generated. Mixin stderr is
  /// forwarded to `progress` as well; mixin stdout only ever lands in the returned lines.
  pub async fn compose(
    &self,
    progress: &mut (dyn Write + Send),
    cancel: &CancellationToken,
  ) -> Result<Vec<String>, ScriptError> {
    writeln!(progress, "\nGenerating Dockerfile =======>").map_err(ScriptError::Progress)?;

    let mut lines = self.base_section()?;
    echo(progress, &lines)?;

    for mixin in &self.manifest.mixins {
      let fragment = self.mixin_section(mixin, progress, cancel).await?;
      echo(progress, &fragment)?;
      lines.extend(fragment);
    }

    let trailer: Vec<String> = app_section().into_iter().chain(cmd_section()).collect();
    echo(progress, &trailer)?;
    lines.extend(trailer);

    info!(lines = lines.len(), mixins = self.manifest.mixins.len(), "dockerfile composed");
    Ok(lines)
  }

  /// Lines of the user's Dockerfile, or of the embedded default.
  pub fn base_section(&self) -> Result<Vec<String>, ScriptError> {
    let Some(custom) = self.manifest.dockerfile.as_deref() else {
      debug!("using default Dockerfile template");
      return Ok(DEFAULT_DOCKERFILE.lines().map(str::to_string).collect());
    };

    let path = self.base_dir.join(custom);
    if !path.is_file() {
      return Err(ScriptError::BaseNotFound(path));
    }

    debug!(path = %path.display(), "using custom Dockerfile");
    let content = std::fs::read_to_string(&path).map_err(|source| ScriptError::ReadBase { path, source })?;
    Ok(content.lines().map(str::to_string).collect())
  }

  async fn mixin_section(
    &self,
    mixin: &str,
    progress: &mut (dyn Write + Send),
    cancel: &CancellationToken,
  ) -> Result<Vec<String>, ScriptError> {
    let dir = self.resolver.mixin_dir(mixin).map_err(|source| ScriptError::ResolveMixin {
      mixin: mixin.to_string(),
      source,
    })?;

    let runner = MixinRunner::new(mixin, dir)
      .with_command(MIXIN_BUILD_COMMAND)
      .with_debug(self.debug)
      .with_working_dir(self.base_dir);
    let wrap = |source| ScriptError::Mixin {
      mixin: mixin.to_string(),
      source,
    };

    runner.validate().map_err(wrap)?;
    let mut io = MixinIo { diagnostics: progress };
    runner.run(&mut io, cancel).await.map_err(wrap)
  }
}

/// The staged `cnab/` tree carries the runtime, mixins, dependencies and manifest.
fn app_section() -> Vec<String> {
  vec!["COPY cnab/ /cnab/".to_string()]
}

fn cmd_section() -> Vec<String> {
  vec![
    r#"RUN chmod 755 "/cnab/app/run""#.to_string(),
    r#"CMD ["/cnab/app/run"]"#.to_string(),
  ]
}

fn echo(progress: &mut (dyn Write + Send), lines: &[String]) -> Result<(), ScriptError> {
  for line in lines {
    writeln!(progress, "{}", line).map_err(ScriptError::Progress)?;
  }
  Ok(())
}

/// Write the Dockerfile into `dir`, replacing any existing one. Returns its path.
pub fn write_dockerfile(dir: &Path, lines: &[String]) -> Result<PathBuf, ScriptError> {
  let path = dir.join(DOCKERFILE);
  std::fs::write(&path, lines.join("\n")).map_err(|source| ScriptError::Write {
    path: path.clone(),
    source,
  })?;
  Ok(path)
}
