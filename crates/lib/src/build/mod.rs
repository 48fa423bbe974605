//! The bundle build pipeline.
//!
//! One call to [`build`] turns a manifest into a pushed invocation image and a
//! provenance-stamped `bundle.json`:
//!
//! 1. load the manifest
//! 2. stage dependencies, the runtime and mixins into the build context
//! 3. compose and write the Dockerfile (driving each mixin's `build` command)
//! 4. build, push and resolve the digest of the invocation image
//! 5. stamp, assemble and atomically write the descriptor
//!
//! Stages run strictly in order and the first failure aborts the build. Nothing is
//! published until the final descriptor write.

mod pipeline;
mod types;

pub use pipeline::build;
pub use types::*;
