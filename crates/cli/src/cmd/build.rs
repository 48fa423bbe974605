//! Implementation of the `packwright build` command.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use packwright_lib::build::{BuildOptions, build};
use packwright_lib::engine::DockerEngine;
use packwright_lib::platform::paths;
use packwright_lib::resolve::HomeResolver;

use crate::output::{OutputFormat, format_duration, print_json, print_stat, print_success, truncate_hash};
use crate::{COMMIT, VERSION};

/// Build the bundle described by `file`.
///
/// Ctrl-C or the optional timeout cancel the build; no bundle is written in that case.
/// In JSON mode build progress goes to stderr so stdout only carries the result.
pub fn cmd_build(
  file: &Path,
  dir: Option<PathBuf>,
  debug: bool,
  timeout: Option<Duration>,
  output: OutputFormat,
) -> Result<()> {
  let start = Instant::now();
  let manifest_path = dunce::canonicalize(file).with_context(|| format!("Manifest not found: {}", file.display()))?;
  let context_dir = match dir {
    Some(dir) => dir,
    None => manifest_path
      .parent()
      .map(Path::to_path_buf)
      .context("Manifest has no parent directory")?,
  };

  let options = BuildOptions {
    manifest_path,
    context_dir,
    version: VERSION.to_string(),
    commit: COMMIT.to_string(),
    debug,
    docker_config_dir: Some(paths::docker_config_dir()),
  };

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let outcome = rt.block_on(async {
    let cancel = CancellationToken::new();
    watch_interrupt(cancel.clone());
    if let Some(limit) = timeout {
      watch_timeout(cancel.clone(), limit);
    }

    let engine = DockerEngine::connect().context("Failed to connect to docker")?;
    let resolver = HomeResolver::from_env();
    info!(home = %resolver.home().display(), "resolving mixins");

    let mut progress: Box<dyn Write + Send> = if output.is_json() {
      Box::new(std::io::stderr())
    } else {
      Box::new(std::io::stdout())
    };
    build(&options, &engine, &resolver, progress.as_mut(), &cancel)
      .await
      .context("Build failed")
  })?;

  if output.is_json() {
    print_json(&serde_json::json!({
      "bundle": outcome.bundle_path,
      "image": outcome.image,
      "digest": outcome.digest,
      "manifestDigest": outcome.manifest_digest,
    }))?;
  } else {
    println!();
    print_success(&format!("Bundle written: {}", outcome.bundle_path.display()));
    print_stat("Image", &outcome.image);
    print_stat("Manifest digest", truncate_hash(&outcome.manifest_digest));
    print_stat("Duration", &format_duration(start.elapsed()));
  }

  Ok(())
}

fn watch_interrupt(cancel: CancellationToken) {
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      warn!("interrupt received, cancelling build");
      cancel.cancel();
    }
  });
}

fn watch_timeout(cancel: CancellationToken, limit: Duration) {
  tokio::spawn(async move {
    tokio::select! {
      _ = cancel.cancelled() => {}
      _ = tokio::time::sleep(limit) => {
        warn!(timeout = %humantime::format_duration(limit), "build timed out, cancelling");
        cancel.cancel();
      }
    }
  });
}
