//! Filesystem helpers for staging the build context.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Error during a directory or file copy.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
  #[error("source directory does not exist: {0}")]
  MissingSource(PathBuf),

  #[error("failed to walk {path}")]
  Walk {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("failed to copy {from} to {to}")]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Recursively copy `src` into `dest_parent`.
///
/// When `include_base_dir` is true the tree lands at `dest_parent/<basename of src>`,
/// otherwise the contents of `src` are copied directly into `dest_parent`.
/// Files, directories and symlinks are all preserved. Returns the number of files copied.
pub fn copy_dir(src: &Path, dest_parent: &Path, include_base_dir: bool) -> Result<usize, CopyError> {
  if !src.is_dir() {
    return Err(CopyError::MissingSource(src.to_path_buf()));
  }

  let dest_root = match (include_base_dir, src.file_name()) {
    (true, Some(name)) => dest_parent.join(name),
    _ => dest_parent.to_path_buf(),
  };

  let mut copied = 0;
  for entry in WalkDir::new(src).sort_by_file_name() {
    let entry = entry.map_err(|source| CopyError::Walk {
      path: src.to_path_buf(),
      source,
    })?;
    let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
    let target = dest_root.join(rel);
    let file_type = entry.file_type();

    if file_type.is_dir() {
      fs::create_dir_all(&target).map_err(|source| copy_err(entry.path(), &target, source))?;
    } else if file_type.is_symlink() {
      copy_symlink(entry.path(), &target)?;
      copied += 1;
    } else if file_type.is_file() {
      copy_file(entry.path(), &target)?;
      copied += 1;
    }
  }

  Ok(copied)
}

/// Copy a single file, creating parent directories and preserving permissions.
pub fn copy_file(from: &Path, to: &Path) -> Result<(), CopyError> {
  if let Some(parent) = to.parent() {
    fs::create_dir_all(parent).map_err(|source| copy_err(from, to, source))?;
  }
  fs::copy(from, to).map_err(|source| copy_err(from, to, source))?;
  Ok(())
}

/// Mark a file as executable (0755). No-op on Windows.
pub fn set_executable(path: &Path) -> io::Result<()> {
  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
  }
  #[cfg(not(unix))]
  {
    let _ = path;
    Ok(())
  }
}

fn copy_symlink(from: &Path, to: &Path) -> Result<(), CopyError> {
  let link_target = fs::read_link(from).map_err(|source| copy_err(from, to, source))?;
  if let Some(parent) = to.parent() {
    fs::create_dir_all(parent).map_err(|source| copy_err(from, to, source))?;
  }
  if to.symlink_metadata().is_ok() {
    fs::remove_file(to).map_err(|source| copy_err(from, to, source))?;
  }

  #[cfg(unix)]
  let result = std::os::unix::fs::symlink(&link_target, to);
  #[cfg(windows)]
  let result = if from.is_dir() {
    std::os::windows::fs::symlink_dir(&link_target, to)
  } else {
    std::os::windows::fs::symlink_file(&link_target, to)
  };

  result.map_err(|source| copy_err(from, to, source))
}

fn copy_err(from: &Path, to: &Path, source: io::Error) -> CopyError {
  CopyError::Copy {
    from: from.to_path_buf(),
    to: to.to_path_buf(),
    source,
  }
}
