//! File system utilities.
//!
//! Safe copy/remove operations with automatic parent creation, symlink
//! preservation, and idempotent handling of missing paths.

use crate::error::{Result, ShellAppError};
use std::io;
use std::path::Path;
use tokio::fs;

/// Creates all of the directories of the specified path, erasing it first
/// if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }

    // create_dir_all is already idempotent - succeeds even if dir exists
    Ok(fs::create_dir_all(path).await?)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()), // Idempotent
        Err(e) => Err(e.into()),
    }
}

/// Moves a directory, falling back to copy + delete when the rename
/// would cross filesystems.
pub async fn move_dir(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => copy_then_remove(from, to).await,
        Err(e) => Err(e.into()),
    }
}

async fn copy_then_remove(from: &Path, to: &Path) -> Result<()> {
    copy_dir(from, to).await?;
    remove_dir_all(from).await
}

/// Removes a file, tolerating its absence.
pub async fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Makes a symbolic link to a directory.
#[cfg(unix)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a directory.
#[cfg(windows)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(unix)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(windows)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

/// Copies a regular file from one path to another, creating any parent
/// directories of the destination path as necessary.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(ShellAppError::Anyhow(anyhow::anyhow!(
            "{from:?} does not exist"
        )));
    }
    if !from.is_file() {
        return Err(ShellAppError::Anyhow(anyhow::anyhow!(
            "{from:?} is not a file"
        )));
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir).await?;
    }
    fs::copy(from, to).await?;
    Ok(())
}

/// Recursively copies a directory from one path to another, creating any
/// parent directories of the destination path as necessary.
///
/// Preserves symlinks on platforms that support them.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(ShellAppError::Anyhow(anyhow::anyhow!(
            "{from:?} does not exist"
        )));
    }
    if !from.is_dir() {
        return Err(ShellAppError::Anyhow(anyhow::anyhow!(
            "{from:?} is not a directory"
        )));
    }

    // Clone paths for move into blocking closure
    let from = from.to_path_buf();
    let to = to.to_path_buf();

    // Offload blocking work to dedicated thread pool
    tokio::task::spawn_blocking(move || -> Result<()> {
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent)?;
        }

        for entry in walkdir::WalkDir::new(&from) {
            let entry = entry.map_err(|e| anyhow::anyhow!("walking {from:?}: {e}"))?;
            debug_assert!(entry.path().starts_with(&from));
            let rel_path = entry
                .path()
                .strip_prefix(&from)
                .map_err(|e| anyhow::anyhow!("stripping prefix: {e}"))?;
            let dest_path = to.join(rel_path);

            if entry.file_type().is_symlink() {
                let target = std::fs::read_link(entry.path())?;
                if entry.path().is_dir() {
                    symlink_dir(&target, &dest_path)?;
                } else {
                    symlink_file(&target, &dest_path)?;
                }
            } else if entry.file_type().is_dir() {
                std::fs::create_dir_all(dest_path)?;
            } else {
                std::fs::copy(entry.path(), dest_path)?;
            }
        }

        Ok(())
    })
    .await
    .map_err(|e| ShellAppError::Anyhow(anyhow::anyhow!("directory copy task panicked: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_dir_all_with_erase_drops_stale_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("stale.txt"), "old").unwrap();

        create_dir_all(&dir, true).await.unwrap();
        assert!(dir.exists());
        assert!(!dir.join("stale.txt").exists());
    }

    #[tokio::test]
    async fn copy_dir_copies_nested_files() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        std::fs::create_dir_all(src.join("nested")).unwrap();
        std::fs::write(src.join("nested/file.txt"), "contents").unwrap();

        let dst = tmp.path().join("dst");
        copy_dir(&src, &dst).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(dst.join("nested/file.txt")).unwrap(),
            "contents"
        );
    }

    #[tokio::test]
    async fn move_dir_relocates_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("file.txt"), "contents").unwrap();

        let dst = tmp.path().join("moved");
        move_dir(&src, &dst).await.unwrap();
        assert!(!src.exists());
        assert_eq!(
            std::fs::read_to_string(dst.join("file.txt")).unwrap(),
            "contents"
        );
    }

    #[tokio::test]
    async fn cross_device_fallback_copies_then_removes_the_source() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        std::fs::create_dir_all(src.join("nested")).unwrap();
        std::fs::write(src.join("nested/file.txt"), "contents").unwrap();

        let dst = tmp.path().join("moved");
        copy_then_remove(&src, &dst).await.unwrap();
        assert!(!src.exists());
        assert_eq!(
            std::fs::read_to_string(dst.join("nested/file.txt")).unwrap(),
            "contents"
        );
    }

    #[tokio::test]
    async fn remove_helpers_are_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        remove_dir_all(&tmp.path().join("missing")).await.unwrap();
        remove_file_if_exists(&tmp.path().join("missing.txt"))
            .await
            .unwrap();
    }
}
