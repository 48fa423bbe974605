//! Mixin invocation.
//!
//! A mixin is an independently installed executable that knows how to build one
//! technology into an invocation image. Packwright talks to it over a small
//! process protocol:
//!
//! - argv is `<command> [--debug]`
//! - stdin carries the input payload (may be empty)
//! - stdout is build-script text, one line per instruction
//! - stderr is free-form diagnostics, forwarded to the caller untouched
//!
//! Mixins are installed at `<home>/mixins/<name>/<name>`.

mod runner;

pub use runner::*;
