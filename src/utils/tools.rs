//! External tool detection.
//!
//! Runtime detection of the external tools the pipeline shells out to,
//! cached to avoid repeated PATH lookups during a run.

use std::sync::LazyLock;

/// Check if sips is available for icon resizing.
pub static HAS_SIPS: LazyLock<bool> = LazyLock::new(|| probe("sips"));

/// Check if xcodebuild is available for building the shell binary.
pub static HAS_XCODEBUILD: LazyLock<bool> = LazyLock::new(|| probe("xcodebuild"));

fn probe(tool: &str) -> bool {
    match which::which(tool) {
        Ok(path) => {
            log::debug!("Found {} at: {}", tool, path.display());
            true
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}", tool, e);
            false
        }
    }
}
