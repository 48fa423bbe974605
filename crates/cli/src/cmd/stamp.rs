//! Implementation of the `packwright stamp` command.

use std::path::Path;

use anyhow::{Context, Result};

use packwright_lib::bundle::read_bundle;
use packwright_lib::stamp::Stamp;

use crate::output::{OutputFormat, or_dash, print_json, print_stat, print_success};

pub fn cmd_stamp(bundle_path: &Path, show_manifest: bool, output: OutputFormat) -> Result<()> {
  let bundle = read_bundle(bundle_path).with_context(|| format!("Failed to read {}", bundle_path.display()))?;
  let stamp = Stamp::load(&bundle).context("Failed to load stamp")?;

  let manifest = if show_manifest {
    let bytes = stamp.decode_manifest().context("Failed to decode embedded manifest")?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
  } else {
    None
  };

  if output.is_json() {
    let mut value = serde_json::to_value(&stamp).context("Failed to serialize stamp")?;
    if let (Some(text), Some(obj)) = (&manifest, value.as_object_mut()) {
      obj.insert("decodedManifest".to_string(), serde_json::Value::String(text.clone()));
    }
    return print_json(&value);
  }

  print_success(&format!("Stamp of {} {}", bundle.name, bundle.version));
  print_stat("Manifest digest", &stamp.manifest_digest);
  print_stat("Version", &stamp.version);
  print_stat("Commit", &or_dash(&stamp.commit));
  let mixins: Vec<&str> = stamp.mixins.keys().map(String::as_str).collect();
  print_stat("Mixins", &or_dash(&mixins.join(", ")));

  if let Some(text) = manifest {
    println!();
    print!("{}", text);
    if !text.ends_with('\n') {
      println!();
    }
  }

  Ok(())
}
