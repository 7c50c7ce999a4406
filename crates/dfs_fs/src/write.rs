use std::path::Path;

use anyhow::{Context, Result};

impl crate::LocalFS {
    pub async fn create_dir_all<T: AsRef<Path>>(path: T) -> Result<()> {
        tokio::fs::create_dir_all(path.as_ref())
            .await
            .with_context(|| format!("Failed to create dir {}", path.as_ref().display()))
    }

    pub async fn remove_file<T: AsRef<Path>>(path: T) -> Result<()> {
        tokio::fs::remove_file(path.as_ref())
            .await
            .with_context(|| format!("Failed to remove file {}", path.as_ref().display()))
    }

    pub async fn remove_dir<T: AsRef<Path>>(path: T) -> Result<()> {
        tokio::fs::remove_dir(path.as_ref())
            .await
            .with_context(|| format!("Failed to remove dir {}", path.as_ref().display()))
    }

    pub async fn remove_dir_all<T: AsRef<Path>>(path: T) -> Result<()> {
        tokio::fs::remove_dir_all(path.as_ref())
            .await
            .with_context(|| format!("Failed to remove dir {}", path.as_ref().display()))
    }

    pub async fn rename<T: AsRef<Path>, U: AsRef<Path>>(from: T, to: U) -> Result<()> {
        tokio::fs::rename(from.as_ref(), to.as_ref())
            .await
            .with_context(|| {
                format!(
                    "Failed to rename {} to {}",
                    from.as_ref().display(),
                    to.as_ref().display()
                )
            })
    }
}
