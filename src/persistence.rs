//! Whole-file JSON storage shared by the file-backed repositories.
//!
//! Writes go to a `.tmp` sibling, are fsynced, and then renamed over the target so a
//! concurrent reader sees either the old or the new contents, never a partial file.

use std::io;
use std::path::Path;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Reads a file, treating a missing one as `None`
pub async fn read_if_exists(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Replaces `path` with `bytes` via write-to-temp-then-rename
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)
            .await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
    }

    fs::rename(&tmp_path, path).await?;

    // Make the rename itself durable
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            File::open(parent).await?.sync_all().await?;
        }
    }

    Ok(())
}
