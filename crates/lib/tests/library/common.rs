//! Shared helpers: a recording engine and a fixed-directory resolver.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use tempfile::TempDir;

use packwright_lib::engine::{ContainerEngine, EngineError, FrameStream, ImageBuildOptions, ProgressFrame, RegistryAuth};
use packwright_lib::resolve::{ResolveError, Resolver};

/// Engine that accepts every build and push and reports a fixed digest.
pub struct RecordingEngine {
  pub digest: String,
  pub tags: Mutex<Vec<String>>,
  pub context_sizes: Mutex<Vec<usize>>,
}

impl RecordingEngine {
  pub fn new(digest: &str) -> Self {
    Self {
      digest: digest.to_string(),
      tags: Mutex::new(Vec::new()),
      context_sizes: Mutex::new(Vec::new()),
    }
  }
}

#[async_trait]
impl ContainerEngine for RecordingEngine {
  fn build<'a>(&'a self, context: Vec<u8>, options: &ImageBuildOptions) -> FrameStream<'a> {
    self.tags.lock().unwrap().extend(options.tags.iter().cloned());
    self.context_sizes.lock().unwrap().push(context.len());
    stream::iter(vec![Ok(ProgressFrame::stream("Successfully built\n"))]).boxed()
  }

  fn push<'a>(&'a self, _image: &'a str, _auth: Option<RegistryAuth>) -> FrameStream<'a> {
    stream::iter(vec![Ok(ProgressFrame::status("Pushed"))]).boxed()
  }

  async fn inspect_digest(&self, _image: &str, _auth: Option<RegistryAuth>) -> Result<String, EngineError> {
    Ok(self.digest.clone())
  }
}

/// Resolver over a single directory: `<root>/<name>` for mixins and bundles.
pub struct DirResolver {
  pub root: PathBuf,
}

impl Resolver for DirResolver {
  fn mixin_dir(&self, name: &str) -> Result<PathBuf, ResolveError> {
    let path = self.root.join(name);
    if path.is_dir() {
      Ok(path)
    } else {
      Err(ResolveError::MixinNotFound {
        name: name.to_string(),
        path,
      })
    }
  }

  fn bundle_dir(&self, name: &str) -> Result<PathBuf, ResolveError> {
    let path = self.root.join(name);
    if path.is_dir() {
      Ok(path)
    } else {
      Err(ResolveError::BundleNotFound {
        name: name.to_string(),
        path,
      })
    }
  }

  fn runtime_path(&self) -> Result<PathBuf, ResolveError> {
    let path = self.root.join("packwright-runtime");
    if path.is_file() {
      Ok(path)
    } else {
      Err(ResolveError::RuntimeNotFound(path))
    }
  }
}

/// A project directory with a manifest and a resolver root containing a runtime.
pub struct Project {
  pub temp: TempDir,
}

impl Project {
  pub fn new(manifest: &str) -> Self {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("project")).unwrap();
    std::fs::create_dir_all(temp.path().join("installed")).unwrap();
    std::fs::write(temp.path().join("project/packwright.yaml"), manifest).unwrap();
    std::fs::write(temp.path().join("installed/packwright-runtime"), "#!/bin/sh\n").unwrap();
    Self { temp }
  }

  pub fn dir(&self) -> PathBuf {
    self.temp.path().join("project")
  }

  pub fn resolver(&self) -> DirResolver {
    DirResolver {
      root: self.temp.path().join("installed"),
    }
  }

  pub fn install(&self, relative: &str, content: &str) {
    let path = self.temp.path().join("installed").join(relative);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
  }
}

pub fn read(path: &Path) -> String {
  std::fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}
