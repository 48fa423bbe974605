//! Embedded templates for the generated build context.

/// Base Dockerfile used when the manifest does not name its own.
pub const DEFAULT_DOCKERFILE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/Dockerfile.tmpl"));

/// Entrypoint script written to `cnab/app/run` when the build directory has none.
pub const RUN_SCRIPT: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/run.tmpl"));
