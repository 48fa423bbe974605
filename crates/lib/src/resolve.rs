//! Resolution of mixin, dependency and runtime locations.
//!
//! The pipeline never hardcodes where mixins or dependency bundles live. It asks a
//! [`Resolver`], which lets tests point the pipeline at temporary directories.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::consts::RUNTIME_BINARY;
use crate::platform::paths;

#[derive(Debug, Error)]
pub enum ResolveError {
  #[error("mixin '{name}' is not installed (looked in {path})")]
  MixinNotFound { name: String, path: PathBuf },

  #[error("dependency bundle '{name}' is not installed (looked in {path})")]
  BundleNotFound { name: String, path: PathBuf },

  #[error("runtime executable not found at {0}")]
  RuntimeNotFound(PathBuf),
}

/// Maps names from the manifest to installed directories.
pub trait Resolver: Send + Sync {
  /// Installation directory of a mixin. The mixin executable lives inside it.
  fn mixin_dir(&self, name: &str) -> Result<PathBuf, ResolveError>;

  /// Resolved directory of a dependency bundle.
  fn bundle_dir(&self, name: &str) -> Result<PathBuf, ResolveError>;

  /// Path of the runtime executable copied into every invocation image.
  fn runtime_path(&self) -> Result<PathBuf, ResolveError>;
}

/// Resolver over a packwright home directory.
#[derive(Debug, Clone)]
pub struct HomeResolver {
  home: PathBuf,
}

impl HomeResolver {
  pub fn new(home: impl Into<PathBuf>) -> Self {
    Self { home: home.into() }
  }

  /// Resolver rooted at `PACKWRIGHT_HOME` (or the platform data directory).
  pub fn from_env() -> Self {
    Self::new(paths::packwright_home())
  }

  pub fn home(&self) -> &Path {
    &self.home
  }
}

impl Resolver for HomeResolver {
  fn mixin_dir(&self, name: &str) -> Result<PathBuf, ResolveError> {
    let path = self.home.join("mixins").join(name);
    if !path.is_dir() {
      return Err(ResolveError::MixinNotFound {
        name: name.to_string(),
        path,
      });
    }
    Ok(path)
  }

  fn bundle_dir(&self, name: &str) -> Result<PathBuf, ResolveError> {
    let path = self.home.join("bundles").join(name);
    if !path.is_dir() {
      return Err(ResolveError::BundleNotFound {
        name: name.to_string(),
        path,
      });
    }
    Ok(path)
  }

  fn runtime_path(&self) -> Result<PathBuf, ResolveError> {
    let path = self.home.join("runtime").join(RUNTIME_BINARY);
    if !path.is_file() {
      return Err(ResolveError::RuntimeNotFound(path));
    }
    Ok(path)
  }
}
