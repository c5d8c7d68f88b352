//! Error types for shell app configuration and build operations.
//!
//! Validation and manifest errors are always raised before any descriptor
//! write; external tool failures abort the pipeline with the captured
//! command and exit code.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for shell app operations
pub type Result<T> = std::result::Result<T, ShellAppError>;

/// Main error type for all shell app operations
#[derive(Error, Debug)]
pub enum ShellAppError {
    /// Invocation argument errors, detected before any IO
    #[error("Invalid arguments: {0}")]
    Validation(#[from] ValidationError),

    /// Required manifest field missing
    #[error("Invalid manifest: {0}")]
    Manifest(#[from] ManifestError),

    /// External tool exited nonzero
    #[error("Command `{command}` failed with exit code {code:?}")]
    ExternalTool {
        /// Command line that was run
        command: String,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
    },

    /// External tool could not be spawned
    #[error("Failed to spawn `{command}`: {source}")]
    CommandSpawn {
        /// Command that failed to start
        command: String,
        /// Underlying spawn error
        source: std::io::Error,
    },

    /// Download failure (manifest assets or JS payload)
    #[error("Failed to download {url}: {reason}")]
    Download {
        /// Source URL
        url: String,
        /// Transport or status failure
        reason: String,
    },

    /// No usable third-party SDK key source
    #[error("No API key configuration found; checked {sources:?}")]
    MissingKeyConfiguration {
        /// Key file paths that were checked
        sources: Vec<PathBuf>,
    },

    /// Descriptor document was not a dictionary at the top level
    #[error("Descriptor {name} at {path} is not a dictionary")]
    MalformedDescriptor {
        /// Logical descriptor name (e.g. "Info")
        name: String,
        /// On-disk location
        path: PathBuf,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Property list parse or serialize errors
    #[error("Property list error: {0}")]
    Plist(#[from] plist::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Argument validation errors, one kind per rejected rule
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Build type outside {simulator, archive}
    #[error("Unsupported build type {0}")]
    UnsupportedBuildType(String),

    /// Configuration not allowed for the requested build type
    #[error("Unsupported build configuration {configuration} for type {build_type}")]
    UnsupportedConfiguration {
        /// Requested build type
        build_type: String,
        /// Rejected configuration
        configuration: String,
    },

    /// Action outside {build, configure}
    #[error("Unsupported build action {0}")]
    UnsupportedAction(String),

    /// Required argument absent for the requested action
    #[error("Missing required argument: --{argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },
}

/// Manifest content errors, checked before any descriptor is touched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    /// Neither `ios.bundleIdentifier` nor `--bundleIdentifier` present
    #[error("No bundle identifier found in either the manifest or arguments")]
    MissingBundleIdentifier,

    /// Manifest has no `name`
    #[error("Manifest does not have a name")]
    MissingName,

    /// A field required by the current step is absent
    #[error("Manifest does not have a {0}")]
    MissingField(&'static str),

    /// No path to config files provided
    #[error("No path to config files provided")]
    MissingConfigPath,
}
