//! Runs a single mixin as a subprocess.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Errors that can occur while validating or running a mixin.
#[derive(Debug, Error)]
pub enum MixinError {
  /// The mixin executable is missing from its install directory.
  #[error("mixin '{name}' is not installed: {path} does not exist")]
  NotInstalled { name: String, path: PathBuf },

  /// No command was set on the runner.
  #[error("no command specified for mixin '{name}'")]
  MissingCommand { name: String },

  /// The process could not be started.
  #[error("failed to start mixin '{name}'")]
  Spawn {
    name: String,
    #[source]
    source: io::Error,
  },

  /// Reading from or writing to the process failed.
  #[error("i/o error talking to mixin '{name}'")]
  Io {
    name: String,
    #[source]
    source: io::Error,
  },

  /// The process exited unsuccessfully.
  #[error("mixin '{name}' failed running '{command}' (exit code {code:?})")]
  Failed {
    name: String,
    command: String,
    code: Option<i32>,
  },

  /// The caller cancelled the run; the process was killed.
  #[error("mixin '{name}' was cancelled")]
  Cancelled { name: String },
}

/// Stream destinations for a single mixin run.
///
/// The mixin's stdout is always captured and returned by [`MixinRunner::run`]; only
/// its stderr needs somewhere to go.
pub struct MixinIo<'a> {
  /// Receives the mixin's stderr, line by line, as it is produced.
  pub diagnostics: &'a mut (dyn Write + Send),
}

/// A configured invocation of one mixin.
#[derive(Debug, Clone)]
pub struct MixinRunner {
  pub name: String,
  pub dir: PathBuf,
  pub command: String,
  pub input: String,
  pub debug: bool,
  /// Directory the mixin runs in. `None` inherits the caller's.
  pub working_dir: Option<PathBuf>,
}

impl MixinRunner {
  pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
    Self {
      name: name.into(),
      dir: dir.into(),
      command: String::new(),
      input: String::new(),
      debug: false,
      working_dir: None,
    }
  }

  pub fn with_command(mut self, command: impl Into<String>) -> Self {
    self.command = command.into();
    self
  }

  pub fn with_input(mut self, input: impl Into<String>) -> Self {
    self.input = input.into();
    self
  }

  pub fn with_debug(mut self, debug: bool) -> Self {
    self.debug = debug;
    self
  }

  pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.working_dir = Some(dir.into());
    self
  }

  /// Path of the mixin executable inside its install directory.
  pub fn executable(&self) -> PathBuf {
    executable_path(&self.dir, &self.name)
  }

  /// Check that the runner is ready: a command is set and the executable exists.
  pub fn validate(&self) -> Result<(), MixinError> {
    if self.command.is_empty() {
      return Err(MixinError::MissingCommand { name: self.name.clone() });
    }

    let exe = self.executable();
    if !exe.is_file() {
      return Err(MixinError::NotInstalled {
        name: self.name.clone(),
        path: exe,
      });
    }

    Ok(())
  }

  /// Run the mixin to completion and return its stdout split into lines.
  ///
  /// stderr is copied to `io.diagnostics` while the process runs. The input payload
  /// is written to stdin, which is then closed. Cancelling `cancel` kills the process.
  pub async fn run(&self, io: &mut MixinIo<'_>, cancel: &CancellationToken) -> Result<Vec<String>, MixinError> {
    info!(mixin = %self.name, command = %self.command, "running mixin");

    let mut command = Command::new(self.executable());
    command
      .arg(&self.command)
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true);
    if self.debug {
      command.arg("--debug");
    }
    if let Some(dir) = &self.working_dir {
      command.current_dir(dir);
    }

    let mut child = command.spawn().map_err(|source| MixinError::Spawn {
      name: self.name.clone(),
      source,
    })?;

    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let input = self.input.as_bytes();
    let diagnostics = &mut *io.diagnostics;

    let feed = async move {
      if let Some(mut stdin) = stdin {
        if !input.is_empty() {
          match stdin.write_all(input).await {
            // The mixin is free to ignore its input and exit early.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
            other => other?,
          }
        }
        drop(stdin);
      }
      Ok::<_, io::Error>(())
    };

    let capture = async move {
      let mut buf = Vec::new();
      if let Some(mut stdout) = stdout {
        stdout.read_to_end(&mut buf).await?;
      }
      Ok::<_, io::Error>(buf)
    };

    let route = async move {
      if let Some(stderr) = stderr {
        let mut lines = BufReader::new(stderr).lines();
        while let Some(line) = lines.next_line().await? {
          writeln!(diagnostics, "{}", line)?;
        }
      }
      Ok::<_, io::Error>(())
    };

    let work = async {
      let (fed, captured, routed) = tokio::join!(feed, capture, route);
      fed?;
      routed?;
      let stdout = captured?;
      let status = child.wait().await?;
      Ok::<(ExitStatus, Vec<u8>), io::Error>((status, stdout))
    };

    let (status, stdout) = tokio::select! {
      _ = cancel.cancelled() => {
        debug!(mixin = %self.name, "mixin run cancelled");
        return Err(MixinError::Cancelled { name: self.name.clone() });
      }
      result = work => result.map_err(|source| MixinError::Io {
        name: self.name.clone(),
        source,
      })?,
    };

    if !status.success() {
      return Err(MixinError::Failed {
        name: self.name.clone(),
        command: self.command.clone(),
        code: status.code(),
      });
    }

    let lines = split_lines(&String::from_utf8_lossy(&stdout));
    debug!(mixin = %self.name, lines = lines.len(), "mixin output captured");
    Ok(lines)
  }
}

#[cfg(windows)]
fn executable_path(dir: &Path, name: &str) -> PathBuf {
  dir.join(format!("{}.exe", name))
}

#[cfg(not(windows))]
fn executable_path(dir: &Path, name: &str) -> PathBuf {
  dir.join(name)
}

/// Split captured stdout on `\n`. A single trailing newline does not produce an empty line.
fn split_lines(output: &str) -> Vec<String> {
  if output.is_empty() {
    return Vec::new();
  }
  output
    .strip_suffix('\n')
    .unwrap_or(output)
    .split('\n')
    .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
    .collect()
}
