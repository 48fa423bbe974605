//! Bundle descriptor.
//!
//! The bundle descriptor (`bundle.json`) is the document an execution engine acts
//! on: it names the digest-pinned invocation image and declares the parameters and
//! credentials the image expects.
//!
//! - [`types`] - Descriptor wire types
//! - [`assemble`] - Conversion from the manifest and atomic write-out

pub mod assemble;
mod types;

pub use assemble::*;
pub use types::*;
