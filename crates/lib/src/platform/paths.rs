//! Well-known directories used by packwright.
//!
//! `PACKWRIGHT_HOME` overrides the installation home. Everything else follows the
//! XDG conventions on Unix and `%APPDATA%` on Windows.

use std::path::PathBuf;

use crate::consts::APP_NAME;

/// Environment variable that overrides the installation home.
pub const HOME_ENV: &str = "PACKWRIGHT_HOME";

/// Environment variable that overrides the docker client configuration directory.
pub const DOCKER_CONFIG_ENV: &str = "DOCKER_CONFIG";

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> PathBuf {
  std::env::var("USERPROFILE")
    .map(PathBuf::from)
    .unwrap_or_else(|_| PathBuf::from("."))
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> PathBuf {
  std::env::var("HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|_| PathBuf::from("."))
}

/// Returns the directory for data files for the application
#[cfg(windows)]
pub fn data_dir() -> PathBuf {
  std::env::var("APPDATA")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir().join("AppData").join("Roaming"))
    .join(APP_NAME)
}

/// Returns the directory for data files for the application
#[cfg(not(windows))]
pub fn data_dir() -> PathBuf {
  let data_home = std::env::var("XDG_DATA_HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir().join(".local").join("share"));
  data_home.join(APP_NAME)
}

/// Installation home holding mixins, dependency bundles and the runtime.
///
/// ```text
/// <home>/
///   mixins/<name>/<name>
///   bundles/<name>/
///   runtime/packwright-runtime
/// ```
pub fn packwright_home() -> PathBuf {
  std::env::var(HOME_ENV)
    .ok()
    .filter(|s| !s.is_empty())
    .map(PathBuf::from)
    .unwrap_or_else(data_dir)
}

pub fn mixins_dir() -> PathBuf {
  packwright_home().join("mixins")
}

/// Directory containing the docker client's `config.json`.
pub fn docker_config_dir() -> PathBuf {
  std::env::var(DOCKER_CONFIG_ENV)
    .ok()
    .filter(|s| !s.is_empty())
    .map(PathBuf::from)
    .unwrap_or_else(|| home_dir().join(".docker"))
}
