//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

use packwright_lib::bundle::{assemble, write_bundle};
use packwright_lib::manifest::Manifest;
use packwright_lib::stamp::Stamp;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated test environment.
///
/// Each test gets its own project directory and packwright home.
pub struct TestEnv {
  pub temp: TempDir,
  pub manifest_path: PathBuf,
}

impl TestEnv {
  /// Create from a fixture manifest, copied to `packwright.yaml`.
  pub fn from_fixture(name: &str) -> Self {
    let env = Self::empty();
    std::fs::write(&env.manifest_path, fixture_content(name)).unwrap();
    env
  }

  pub fn empty() -> Self {
    let temp = TempDir::new().unwrap();
    let manifest_path = temp.path().join("packwright.yaml");
    Self { temp, manifest_path }
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn bundle_path(&self) -> PathBuf {
    self.temp.path().join("bundle.json")
  }

  /// Isolated packwright home.
  pub fn home_path(&self) -> PathBuf {
    let p = self.temp.path().join("home");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Write `bundle.json` as a build of the current manifest would have, without docker.
  pub fn write_stamped_bundle(&self, version: &str, commit: &str) {
    let bytes = std::fs::read(&self.manifest_path).unwrap();
    let manifest = Manifest::from_slice(&bytes, &self.manifest_path).unwrap();
    let stamp = Stamp::generate(&bytes, version, commit, manifest.mixins.iter().cloned());
    let bundle = assemble(&manifest, "sha256:deadbeef", &stamp).unwrap();
    write_bundle(self.temp.path(), &bundle).unwrap();
  }

  /// Get a pre-configured Command for the packwright binary.
  ///
  /// Sets environment variables for isolated testing:
  /// - `PACKWRIGHT_HOME`: isolated home (no mixins or runtime installed)
  /// - `DOCKER_CONFIG`: empty docker client config directory
  /// - `DOCKER_HOST`: a socket nothing listens on
  pub fn packwright_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("packwright");
    cmd.current_dir(self.temp.path());
    cmd.env("PACKWRIGHT_HOME", self.home_path());
    cmd.env("DOCKER_CONFIG", self.temp.path().join("docker"));
    cmd.env("DOCKER_HOST", "unix:///nonexistent/packwright-test.sock");
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
