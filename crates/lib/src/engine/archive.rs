//! Tar archives of a build context directory.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Archive the contents of `dir` so that `dir` becomes the root of the build context.
///
/// Symlinks are stored as links, not followed.
pub fn archive_context(dir: &Path) -> io::Result<Vec<u8>> {
  let mut builder = tar::Builder::new(Vec::new());
  builder.follow_symlinks(false);
  builder.append_dir_all(".", dir)?;
  let bytes = builder.into_inner()?;
  debug!(dir = %dir.display(), size = bytes.len(), "archived build context");
  Ok(bytes)
}

/// [`archive_context`] on the blocking pool.
pub async fn archive_context_async(dir: PathBuf) -> io::Result<Vec<u8>> {
  tokio::task::spawn_blocking(move || archive_context(&dir))
    .await
    .map_err(io::Error::other)?
}
