//! Icon plan execution.
//!
//! The six grid cells have no data dependency on each other and run
//! concurrently, bounded by a small worker limit so the external resize
//! tool is not overwhelmed. The shared default download is single-flight:
//! at most one in-flight request, fanning out to every cell that falls
//! back to it.

use super::{IconDownload, IconInstruction, IconPlan};
use crate::error::{Result, ShellAppError};
use crate::utils::{fs, http};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{OnceCell, Semaphore};
use tokio::task::JoinSet;

/// Worker limit for concurrent cell materialization
const MAX_CONCURRENT_CELLS: usize = 3;

/// Execute an icon plan inside the config directory.
///
/// Skipped cells only log a warning; any download or resize failure aborts
/// the run. The shared default download is removed afterwards when the plan
/// says at least one cell consumed it.
pub async fn materialize_icons(
    plan: &IconPlan,
    app_icon: Option<&IconDownload>,
    config_dir: &Path,
) -> Result<()> {
    let default_download: Arc<OnceCell<PathBuf>> = Arc::new(OnceCell::new());
    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_CELLS));
    let mut tasks: JoinSet<Result<()>> = JoinSet::new();

    for instruction in plan.instructions.iter().cloned() {
        let config_dir = config_dir.to_path_buf();
        let app_icon = app_icon.cloned();
        let default_download = Arc::clone(&default_download);
        let semaphore = Arc::clone(&semaphore);

        tasks.spawn(async move {
            let _permit = semaphore
                .acquire()
                .await
                .map_err(|e| ShellAppError::Anyhow(anyhow::anyhow!("worker pool closed: {e}")))?;
            materialize_cell(instruction, app_icon.as_ref(), &default_download, &config_dir).await
        });
    }

    while let Some(joined) = tasks.join_next().await {
        joined.map_err(|e| ShellAppError::Anyhow(anyhow::anyhow!("icon task panicked: {e}")))??;
    }

    // Clean up the shared default only after the whole fan-out finished
    if plan.delete_default_after
        && let Some(path) = default_download.get()
    {
        fs::remove_file_if_exists(path).await?;
    }

    Ok(())
}

async fn materialize_cell(
    instruction: IconInstruction,
    app_icon: Option<&IconDownload>,
    default_download: &OnceCell<PathBuf>,
    config_dir: &Path,
) -> Result<()> {
    match instruction {
        IconInstruction::Skip { reason, .. } => {
            log::warn!("{}", reason);
            Ok(())
        }
        IconInstruction::UseOverride { cell, source_url } => {
            let source = config_dir.join(cell.source_filename());
            http::download_to_path(&source_url, &source).await?;

            let target = config_dir.join(cell.target_filename());
            fs::copy_file(&source, &target).await?;
            resize(&target, cell.pixel_size()).await?;

            // Per-cell downloads are one-shot; drop them once derived
            fs::remove_file_if_exists(&source).await
        }
        IconInstruction::UseDefault { cell } => {
            let source = default_source(app_icon, default_download, config_dir).await?;
            let target = config_dir.join(cell.target_filename());
            fs::copy_file(source, &target).await?;
            resize(&target, cell.pixel_size()).await
        }
    }
}

/// Single-flight download of the shared default icon
async fn default_source<'a>(
    app_icon: Option<&IconDownload>,
    default_download: &'a OnceCell<PathBuf>,
    config_dir: &Path,
) -> Result<&'a PathBuf> {
    let app_icon = app_icon.ok_or_else(|| {
        // resolve_icon_plan only emits UseDefault when iconUrl exists
        ShellAppError::Anyhow(anyhow::anyhow!(
            "icon plan uses a default image but the manifest has no iconUrl"
        ))
    })?;

    default_download
        .get_or_try_init(|| async {
            let path = config_dir.join(&app_icon.filename);
            http::download_to_path(&app_icon.url, &path).await?;
            Ok(path)
        })
        .await
}

/// Resize an image in place with the platform image tool
async fn resize(path: &Path, pixel_size: u32) -> Result<()> {
    let status = tokio::process::Command::new("sips")
        .arg("-Z")
        .arg(pixel_size.to_string())
        .arg(path)
        .stdout(std::process::Stdio::null())
        .status()
        .await
        .map_err(|e| ShellAppError::CommandSpawn {
            command: "sips".to_string(),
            source: e,
        })?;

    if !status.success() {
        return Err(ShellAppError::ExternalTool {
            command: format!("sips -Z {} {}", pixel_size, path.display()),
            code: status.code(),
        });
    }
    Ok(())
}
