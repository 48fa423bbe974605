use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;

use output::{OutputFormat, print_error};

/// Version recorded in every stamp.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commit recorded in every stamp, set at compile time through `PACKWRIGHT_COMMIT`.
pub const COMMIT: &str = match option_env!("PACKWRIGHT_COMMIT") {
  Some(commit) => commit,
  None => "",
};

/// packwright - build portable application bundles
#[derive(Parser)]
#[command(name = "packwright")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build the invocation image and write bundle.json
  Build {
    /// Path to the manifest
    #[arg(short, long, default_value = "packwright.yaml")]
    file: PathBuf,

    /// Build context directory (default: the manifest's directory)
    #[arg(short = 'C', long)]
    dir: Option<PathBuf>,

    /// Run mixins in debug mode
    #[arg(long)]
    debug: bool,

    /// Abort the build after this long (e.g. 10m, 90s)
    #[arg(long)]
    timeout: Option<humantime::Duration>,

    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Show the provenance stamp of a bundle
  Stamp {
    /// Path to the bundle descriptor
    #[arg(default_value = "bundle.json")]
    bundle: PathBuf,

    /// Print the manifest embedded in the stamp
    #[arg(long)]
    manifest: bool,

    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Check whether a bundle was built from the current manifest
  Verify {
    /// Path to the bundle descriptor
    #[arg(short, long, default_value = "bundle.json")]
    bundle: PathBuf,

    /// Path to the manifest
    #[arg(short, long, default_value = "packwright.yaml")]
    file: PathBuf,

    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Show tool and environment information
  Info {
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },
}

fn main() {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Build {
      file,
      dir,
      debug,
      timeout,
      output,
    } => cmd::cmd_build(&file, dir, debug, timeout.map(Into::into), output),
    Commands::Stamp {
      bundle,
      manifest,
      output,
    } => cmd::cmd_stamp(&bundle, manifest, output),
    Commands::Verify { bundle, file, output } => cmd::cmd_verify(&bundle, &file, output),
    Commands::Info { output } => cmd::cmd_info(output),
  };

  if let Err(err) = result {
    print_error(&format!("{err:#}"));
    std::process::exit(1);
  }
}
