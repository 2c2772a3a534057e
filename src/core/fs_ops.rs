// src/core/fs_ops.rs
//! File system helpers shared by configuration, storage and logging

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use tokio::fs;
use tracing::info;

pub struct FsOps;

impl FsOps {
    /// Create `path` and its parents if missing
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            info!("Created directory: {}", path.display());
        }
        Ok(())
    }

    /// Open the log file for writing, clearing what the previous session left
    pub fn create_log_file(path: &Path) -> Result<File> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_ensure_dir_exists_creates_nested_dirs() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");

        FsOps::ensure_dir_exists(&nested).await.unwrap();
        assert!(nested.is_dir());

        // second call is a no-op
        FsOps::ensure_dir_exists(&nested).await.unwrap();
    }

    #[test]
    fn test_create_log_file_truncates() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("logs").join("termijob.log");

        let mut file = FsOps::create_log_file(&path).unwrap();
        file.write_all(b"old session").unwrap();
        drop(file);

        FsOps::create_log_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
