//! App descriptor (property list) IO with backup lifecycle.
//!
//! Every mutation goes through [`modify`]: the original document is
//! snapshotted to `{name}.plist.bak` before the patched version is written.
//! Exactly one of restore-from-backup or delete-backup happens per
//! descriptor per run, via [`clean_backup`]. A failed run leaves the backup
//! in place for manual recovery.

pub mod patch;

use crate::error::{Result, ShellAppError};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Logical name of the shell runtime config descriptor
pub const SHELL_DESCRIPTOR: &str = "EXShell";
/// Logical name of the app info descriptor
pub const INFO_DESCRIPTOR: &str = "Info";

/// On-disk path of a descriptor document
pub fn descriptor_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.plist"))
}

/// On-disk path of a descriptor backup
pub fn backup_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.plist.bak"))
}

/// Read a descriptor document into a dictionary
pub async fn read_descriptor(dir: &Path, name: &str) -> Result<plist::Dictionary> {
    let path = descriptor_path(dir, name);
    let bytes = fs::read(&path).await?;
    parse_descriptor(&bytes, name, &path)
}

fn parse_descriptor(bytes: &[u8], name: &str, path: &Path) -> Result<plist::Dictionary> {
    plist::Value::from_reader(Cursor::new(bytes))?
        .into_dictionary()
        .ok_or_else(|| ShellAppError::MalformedDescriptor {
            name: name.to_string(),
            path: path.to_path_buf(),
        })
}

/// Write a descriptor document as XML
pub async fn write_descriptor(dir: &Path, name: &str, descriptor: plist::Dictionary) -> Result<()> {
    let mut buf = Vec::new();
    plist::Value::Dictionary(descriptor).to_writer_xml(&mut buf)?;
    fs::write(descriptor_path(dir, name), buf).await?;
    Ok(())
}

/// Apply a pure patch to a descriptor, snapshotting the original first.
///
/// The snapshot is only taken once: re-running a configure against the same
/// directory keeps the original pre-run document as the backup.
pub async fn modify<F>(dir: &Path, name: &str, patch: F) -> Result<()>
where
    F: FnOnce(plist::Dictionary) -> Result<plist::Dictionary>,
{
    let path = descriptor_path(dir, name);
    let bytes = fs::read(&path).await?;

    let backup = backup_path(dir, name);
    if !fs::try_exists(&backup).await? {
        fs::write(&backup, &bytes).await?;
    }

    let current = parse_descriptor(&bytes, name, &path)?;
    let patched = patch(current)?;
    write_descriptor(dir, name, patched).await
}

/// Finish a descriptor's lifecycle: restore the snapshot or commit.
///
/// With `restore = true` the backup is copied over the descriptor before
/// being deleted; otherwise the backup is simply deleted. A missing backup
/// is not an error, so this is safe to call on failure paths where no write
/// ever happened.
pub async fn clean_backup(dir: &Path, name: &str, restore: bool) -> Result<()> {
    let backup = backup_path(dir, name);
    match fs::read(&backup).await {
        Ok(bytes) => {
            if restore {
                fs::write(descriptor_path(dir, name), bytes).await?;
            }
            fs::remove_file(&backup).await?;
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plist::Value;

    fn seed(dir: &Path, name: &str, key: &str, value: &str) {
        let mut d = plist::Dictionary::new();
        d.insert(key.to_string(), Value::String(value.to_string()));
        let mut buf = Vec::new();
        Value::Dictionary(d).to_writer_xml(&mut buf).unwrap();
        std::fs::write(descriptor_path(dir, name), buf).unwrap();
    }

    #[tokio::test]
    async fn modify_snapshots_then_patches() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path(), "Info", "CFBundleName", "Template");

        modify(tmp.path(), "Info", |mut d| {
            d.insert(
                "CFBundleName".to_string(),
                Value::String("Acme".to_string()),
            );
            Ok(d)
        })
        .await
        .unwrap();

        let patched = read_descriptor(tmp.path(), "Info").await.unwrap();
        assert_eq!(
            patched.get("CFBundleName").and_then(Value::as_string),
            Some("Acme")
        );
        assert!(backup_path(tmp.path(), "Info").exists());
    }

    #[tokio::test]
    async fn commit_deletes_backup_and_keeps_edits() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path(), "Info", "CFBundleName", "Template");

        modify(tmp.path(), "Info", |mut d| {
            d.insert("isShell".to_string(), Value::Boolean(true));
            Ok(d)
        })
        .await
        .unwrap();
        clean_backup(tmp.path(), "Info", false).await.unwrap();

        assert!(!backup_path(tmp.path(), "Info").exists());
        let kept = read_descriptor(tmp.path(), "Info").await.unwrap();
        assert_eq!(kept.get("isShell").and_then(Value::as_boolean), Some(true));
    }

    #[tokio::test]
    async fn restore_rolls_back_edits() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path(), "EXShell", "manifestUrl", "https://original");

        modify(tmp.path(), "EXShell", |mut d| {
            d.insert(
                "manifestUrl".to_string(),
                Value::String("https://patched".to_string()),
            );
            Ok(d)
        })
        .await
        .unwrap();
        clean_backup(tmp.path(), "EXShell", true).await.unwrap();

        let restored = read_descriptor(tmp.path(), "EXShell").await.unwrap();
        assert_eq!(
            restored.get("manifestUrl").and_then(Value::as_string),
            Some("https://original")
        );
        assert!(!backup_path(tmp.path(), "EXShell").exists());
    }

    #[tokio::test]
    async fn backup_keeps_the_pre_run_original_across_repeat_modifies() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path(), "Info", "CFBundleVersion", "1");

        for version in ["2", "3"] {
            modify(tmp.path(), "Info", |mut d| {
                d.insert(
                    "CFBundleVersion".to_string(),
                    Value::String(version.to_string()),
                );
                Ok(d)
            })
            .await
            .unwrap();
        }
        clean_backup(tmp.path(), "Info", true).await.unwrap();

        let restored = read_descriptor(tmp.path(), "Info").await.unwrap();
        assert_eq!(
            restored.get("CFBundleVersion").and_then(Value::as_string),
            Some("1")
        );
    }

    #[tokio::test]
    async fn clean_backup_without_backup_is_a_no_op() {
        let tmp = tempfile::tempdir().unwrap();
        clean_backup(tmp.path(), "Info", false).await.unwrap();
        clean_backup(tmp.path(), "Info", true).await.unwrap();
    }
}
