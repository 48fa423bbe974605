//! Fixed names and paths shared across the build pipeline.

pub const APP_NAME: &str = "packwright";

/// Default manifest file name, relative to the build directory.
pub const MANIFEST_FILE: &str = "packwright.yaml";

/// Generated build script, written into the build directory.
pub const DOCKERFILE: &str = "Dockerfile";

/// Bundle descriptor, written into the build directory.
pub const BUNDLE_FILE: &str = "bundle.json";

/// Key under which the stamp is stored in the bundle's custom metadata.
pub const CUSTOM_STAMP_KEY: &str = "sh.packwright/v1";

/// Image technology tag recorded on every invocation image.
pub const IMAGE_TYPE: &str = "docker";

/// Descriptor schema version written into `bundle.json`.
pub const BUNDLE_SCHEMA_VERSION: &str = "v1.0.0-WD";

/// Build context layout. All paths are relative to the build directory.
pub const BUNDLES_CONTEXT_DIR: &str = "cnab/app/bundles";
pub const MIXINS_CONTEXT_DIR: &str = "cnab/app/mixins";
pub const RUNTIME_CONTEXT_PATH: &str = "cnab/app/packwright-runtime";
pub const RUN_SCRIPT_CONTEXT_PATH: &str = "cnab/app/run";
/// Copy of the loaded manifest, shipped in the image as `/cnab/app/packwright.yaml`.
pub const MANIFEST_CONTEXT_PATH: &str = "cnab/app/packwright.yaml";

/// In-image location of the application directory, passed as the `BUNDLE_DIR` build arg.
pub const IMAGE_BUNDLE_DIR: &str = "/cnab/app";

/// Command sent to every mixin while generating the build script.
pub const MIXIN_BUILD_COMMAND: &str = "build";

/// Implicit debug toggle injected into every bundle.
pub const DEBUG_PARAMETER: &str = "packwright-debug";
pub const DEBUG_PARAMETER_ENV: &str = "PACKWRIGHT_DEBUG";

/// Runtime executable name inside `PACKWRIGHT_HOME/runtime/`.
pub const RUNTIME_BINARY: &str = "packwright-runtime";
