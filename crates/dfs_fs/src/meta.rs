use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};

/// Status of one entry on the local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEntry {
    pub name: String,
    pub is_dir: bool,
    pub len: u64,
    pub modified: SystemTime,
}

impl LocalEntry {
    fn new(name: String, metadata: &std::fs::Metadata) -> Self {
        Self {
            name,
            is_dir: metadata.is_dir(),
            len: if metadata.is_dir() { 0 } else { metadata.len() },
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        }
    }
}

impl crate::LocalFS {
    pub fn exists<T: AsRef<Path>>(path: T) -> bool {
        path.as_ref().exists()
    }

    pub fn is_file<T: AsRef<Path>>(path: T) -> bool {
        path.as_ref().is_file()
    }

    pub fn is_dir<T: AsRef<Path>>(path: T) -> bool {
        path.as_ref().is_dir()
    }

    /// Returns `None` when nothing exists at `path`.
    pub async fn stat<T: AsRef<Path>>(path: T) -> Result<Option<LocalEntry>> {
        let path = path.as_ref();
        match tokio::fs::metadata(path).await {
            Ok(metadata) => {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default();
                Ok(Some(LocalEntry::new(name, &metadata)))
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error)
                .with_context(|| format!("Failed to get metadata for {}", path.display())),
        }
    }

    /// Lists the direct children of a directory, sorted by name.
    pub async fn read_dir<T: AsRef<Path>>(path: T) -> Result<Vec<LocalEntry>> {
        let path = path.as_ref();
        let mut dir = tokio::fs::read_dir(path)
            .await
            .with_context(|| format!("Failed to read directory {}", path.display()))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .with_context(|| format!("Failed to read directory {}", path.display()))?
        {
            let metadata = entry.metadata().await.with_context(|| {
                format!("Failed to get metadata for {}", entry.path().display())
            })?;
            entries.push(LocalEntry::new(
                entry.file_name().to_string_lossy().to_string(),
                &metadata,
            ));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
