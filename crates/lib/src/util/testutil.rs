//! Test utilities for packwright-lib.
//!
//! Helpers for laying out a fake packwright home with shell-script mixins.

use std::fs;
use std::path::{Path, PathBuf};

use crate::consts::RUNTIME_BINARY;
use crate::util::fs::set_executable;

/// Install a mixin whose executable is the given shell script body.
///
/// Creates `<home>/mixins/<name>/<name>` with a `#!/bin/sh` shebang and mode 0755.
#[cfg(unix)]
pub fn install_mixin(home: &Path, name: &str, script: &str) -> PathBuf {
  let dir = home.join("mixins").join(name);
  fs::create_dir_all(&dir).unwrap();
  let exe = dir.join(name);
  fs::write(&exe, format!("#!/bin/sh\n{}\n", script)).unwrap();
  set_executable(&exe).unwrap();
  dir
}

/// Install a dependency bundle directory containing a single marker file.
pub fn install_bundle(home: &Path, name: &str) -> PathBuf {
  let dir = home.join("bundles").join(name);
  fs::create_dir_all(&dir).unwrap();
  fs::write(dir.join("bundle.json"), format!("{{\"name\":\"{}\"}}", name)).unwrap();
  dir
}

/// Install a placeholder runtime executable.
pub fn install_runtime(home: &Path) -> PathBuf {
  let dir = home.join("runtime");
  fs::create_dir_all(&dir).unwrap();
  let exe = dir.join(RUNTIME_BINARY);
  fs::write(&exe, "#!/bin/sh\nexit 0\n").unwrap();
  set_executable(&exe).unwrap();
  exe
}
