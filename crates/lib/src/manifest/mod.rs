//! Application manifest.
//!
//! The manifest is the user-authored description of a bundle: the image to build,
//! the mixins that contribute to it, and the parameters and credentials it accepts.

mod types;

pub use types::*;
