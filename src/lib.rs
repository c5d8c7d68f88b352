//! White-label iOS shell app configuration and build library.
//!
//! A shell app is a pre-built native template customized per customer via a
//! remotely hosted manifest rather than a recompilation of UI code. This
//! library resolves the manifest, CLI overrides, and a private-secrets file
//! into a consistent set of property-list edits, materializes the app icon
//! matrix, preloads the JS payload, and packages the result.
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod assets;
pub mod builder;
pub mod cli;
pub mod descriptor;
pub mod error;
pub mod manifest;
pub mod secrets;
pub mod utils;

// Re-export commonly used types
pub use error::{ManifestError, Result, ShellAppError, ValidationError};
