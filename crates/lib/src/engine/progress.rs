//! Rendering and draining of engine progress streams.

use std::io::{self, Write};

use futures_util::StreamExt;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::engine::{EngineError, FrameStream, ProgressFrame};

#[derive(Debug, Error)]
pub enum DrainError {
  /// The stream carried an error frame.
  #[error("{0}")]
  Frame(String),

  #[error(transparent)]
  Engine(#[from] EngineError),

  #[error("cancelled")]
  Cancelled,

  #[error("failed to write progress")]
  Progress(#[source] io::Error),
}

impl DrainError {
  /// Message reported by the engine, if the failure came from the engine.
  pub fn engine_message(&self) -> Option<String> {
    match self {
      DrainError::Frame(msg) => Some(msg.clone()),
      DrainError::Engine(EngineError::Stream(msg)) => Some(msg.clone()),
      DrainError::Engine(e) => Some(e.to_string()),
      _ => None,
    }
  }
}

/// Render a frame the way the docker CLI prints non-terminal progress.
pub fn render(frame: &ProgressFrame) -> Option<String> {
  if let Some(stream) = &frame.stream {
    return Some(stream.clone());
  }

  let status = frame.status.as_deref()?;
  let mut line = String::new();
  if let Some(id) = &frame.id {
    line.push_str(id);
    line.push_str(": ");
  }
  line.push_str(status);
  if let Some(progress) = frame.progress.as_deref().filter(|p| !p.is_empty()) {
    line.push(' ');
    line.push_str(progress);
  }
  line.push('\n');
  Some(line)
}

/// Consume `stream` to the end, writing rendered frames to `progress`.
///
/// Stops at the first error frame or engine error. Returns the number of frames seen.
pub async fn drain(
  mut stream: FrameStream<'_>,
  progress: &mut (dyn Write + Send),
  cancel: &CancellationToken,
) -> Result<usize, DrainError> {
  let mut frames = 0;

  loop {
    let next = tokio::select! {
      _ = cancel.cancelled() => return Err(DrainError::Cancelled),
      next = stream.next() => next,
    };

    let Some(item) = next else {
      return Ok(frames);
    };
    let frame = item?;
    frames += 1;

    if let Some(error) = frame.error {
      return Err(DrainError::Frame(error));
    }
    if let Some(text) = render(&frame) {
      progress.write_all(text.as_bytes()).map_err(DrainError::Progress)?;
    }
  }
}
