//! Final output packaging for the configure path.
//!
//! Simulator builds are renamed to the customer's app name and tarred;
//! archive builds are moved wholesale to the output path.

use crate::error::{Result, ShellAppError};
use crate::utils::fs;
use std::path::{Path, PathBuf};

/// Name of the template app/archive inside the build tree
const TEMPLATE_NAME: &str = "Exponent";

/// Manifest name with all whitespace stripped, used as the .app name
pub fn sanitized_app_name(manifest_name: &str) -> String {
    manifest_name.split_whitespace().collect()
}

/// Rename the configured simulator app after the customer and tar it.
///
/// `config_dir` is the root of the configured `.app` bundle; the tar member
/// is `{SanitizedName}.app`.
pub async fn package_simulator_app(
    config_dir: &Path,
    manifest_name: &str,
    output: &Path,
) -> Result<PathBuf> {
    let parent = app_parent(config_dir)?;
    let app_name = format!("{}.app", sanitized_app_name(manifest_name));
    let renamed = parent.join(&app_name);

    tokio::fs::rename(parent.join(format!("{TEMPLATE_NAME}.app")), &renamed).await?;

    if let Some(out_parent) = output.parent() {
        tokio::fs::create_dir_all(out_parent).await?;
    }

    let output = output.to_path_buf();
    let result = output.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let file = std::fs::File::create(&output)?;
        let mut tar = tar::Builder::new(file);
        tar.follow_symlinks(false);
        tar.append_dir_all(&app_name, &renamed)?;
        tar.finish()?;
        Ok(())
    })
    .await
    .map_err(|e| ShellAppError::Anyhow(anyhow::anyhow!("tar task panicked: {e}")))??;

    Ok(result)
}

/// Move the configured xcarchive to the output path.
///
/// The archive root sits four levels above the config directory
/// (`.xcarchive/Products/Applications/{App}.app/` holds the config files).
pub async fn package_archive(config_dir: &Path, output: &Path) -> Result<PathBuf> {
    let archive_root = config_dir
        .ancestors()
        .nth(4)
        .ok_or_else(|| anyhow::anyhow!("config path {config_dir:?} too shallow for an archive"))?;

    if let Some(out_parent) = output.parent() {
        tokio::fs::create_dir_all(out_parent).await?;
    }
    // The output path may sit on a different filesystem than the build tree
    fs::move_dir(&archive_root.join(format!("{TEMPLATE_NAME}.xcarchive")), output).await?;
    Ok(output.to_path_buf())
}

fn app_parent(config_dir: &Path) -> Result<&Path> {
    config_dir
        .parent()
        .ok_or_else(|| anyhow::anyhow!("config path {config_dir:?} has no parent").into())
}
