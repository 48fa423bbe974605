//! Build-script generation.
//!
//! The generated Dockerfile is assembled from four sections, always in this order:
//!
//! 1. the base: the manifest's own Dockerfile, or the embedded default
//! 2. one fragment per mixin, in manifest order, produced by running `<mixin> build`
//! 3. copies of the application files (`cnab/` and the manifest)
//! 4. the entrypoint, marked executable and set as the image command
//!
//! - [`compose`] - Section assembly and mixin invocation
//! - [`templates`] - Embedded default Dockerfile and run script

pub mod compose;
pub mod templates;

pub use compose::*;
