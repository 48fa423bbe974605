use anyhow::Result;

use packwright_lib::platform::paths;

use crate::output::{OutputFormat, or_dash, print_info, print_json, print_stat};
use crate::{COMMIT, VERSION};

pub fn cmd_info(output: OutputFormat) -> Result<()> {
  let home = paths::packwright_home();
  let mixins = installed(&paths::mixins_dir());

  if output.is_json() {
    return print_json(&serde_json::json!({
      "version": VERSION,
      "commit": COMMIT,
      "home": home,
      "dockerConfig": paths::docker_config_dir(),
      "mixins": mixins,
    }));
  }

  print_info(&format!("packwright {}", VERSION));
  print_stat("Commit", &or_dash(COMMIT));
  print_stat("Home", &home.display().to_string());
  print_stat("Docker config", &paths::docker_config_dir().display().to_string());
  print_stat("Mixins", &or_dash(&mixins.join(", ")));
  Ok(())
}

fn installed(dir: &std::path::Path) -> Vec<String> {
  let Ok(entries) = std::fs::read_dir(dir) else {
    return Vec::new();
  };
  let mut names: Vec<String> = entries
    .filter_map(|e| e.ok())
    .filter(|e| e.path().is_dir())
    .filter_map(|e| e.file_name().into_string().ok())
    .collect();
  names.sort();
  names
}
