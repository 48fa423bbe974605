//! packwright-lib: build pipeline for packwright bundles
//!
//! Turns a `packwright.yaml` manifest into a pushed, digest-pinned invocation image
//! and a provenance-stamped bundle descriptor:
//! - `manifest`: the declarative application description
//! - `mixin`: the out-of-process build tool protocol
//! - `dockerfile`: build-script composition from a base, mixin fragments and trailers
//! - `stage`: copying dependencies, the runtime and mixins into the build context
//! - `engine`: container engine access (build, push, digest inspection)
//! - `stamp`: the provenance record embedded in every bundle
//! - `bundle`: descriptor types and assembly
//! - `build`: the pipeline tying all of the above together

pub mod build;
pub mod bundle;
pub mod consts;
pub mod dockerfile;
pub mod engine;
pub mod manifest;
pub mod mixin;
pub mod platform;
pub mod reference;
pub mod resolve;
pub mod stage;
pub mod stamp;
pub mod util;
