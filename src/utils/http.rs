//! HTTP download helpers for icon sources and the JS payload.

use crate::error::{Result, ShellAppError};
use std::path::Path;

/// Downloads a URL to a local file, creating parent directories as needed.
///
/// Failure aborts the run; downloads are not retried.
pub async fn download_to_path(url: &str, dest: &Path) -> Result<()> {
    url::Url::parse(url).map_err(|e| ShellAppError::Download {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    log::info!("Downloading {} to {}", url, dest.display());

    let response = reqwest::get(url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| ShellAppError::Download {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let bytes = response.bytes().await.map_err(|e| ShellAppError::Download {
        url: url.to_string(),
        reason: format!("failed to read response: {e}"),
    })?;

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(dest, &bytes).await?;
    Ok(())
}
