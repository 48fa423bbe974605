//! Implementation of the `packwright verify` command.
//!
//! Recomputes the manifest digest with the version and commit recorded in the
//! bundle's stamp and compares it with the recorded digest.

use std::path::Path;

use anyhow::{Context, Result, bail};

use packwright_lib::bundle::read_bundle;
use packwright_lib::stamp::{Stamp, compute_digest};

use crate::output::{OutputFormat, print_json, print_stat, print_success, print_warning, truncate_hash};
use crate::VERSION;

pub fn cmd_verify(bundle_path: &Path, manifest_path: &Path, output: OutputFormat) -> Result<()> {
  let bundle = read_bundle(bundle_path).with_context(|| format!("Failed to read {}", bundle_path.display()))?;
  let stamp = Stamp::load(&bundle).context("Failed to load stamp")?;
  let manifest =
    std::fs::read(manifest_path).with_context(|| format!("Failed to read manifest {}", manifest_path.display()))?;

  let current = compute_digest(&manifest, &stamp.version, &stamp.commit);
  let up_to_date = current == stamp.manifest_digest;
  let built_by_other_version = stamp.version != VERSION;

  if output.is_json() {
    print_json(&serde_json::json!({
      "upToDate": up_to_date,
      "stampedDigest": stamp.manifest_digest,
      "currentDigest": current,
      "stampedVersion": stamp.version,
    }))?;
  } else if up_to_date {
    print_success(&format!("{} is up to date with {}", bundle_path.display(), manifest_path.display()));
    print_stat("Manifest digest", truncate_hash(&current));
  } else {
    print_warning(&format!("{} is out of date with {}", bundle_path.display(), manifest_path.display()));
    print_stat("Stamped", truncate_hash(&stamp.manifest_digest));
    print_stat("Current", truncate_hash(&current));
  }

  if up_to_date && built_by_other_version && !output.is_json() {
    print_stat("Note", &format!("built by packwright {}, this is {}", stamp.version, VERSION));
  }

  if !up_to_date {
    bail!("bundle is out of date, rebuild it with `packwright build`");
  }
  Ok(())
}
