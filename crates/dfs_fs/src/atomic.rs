use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::Error;

const TEMP_SUFFIX: &str = "._COPYING_";

/// A file written through a temporary sibling and moved over its target only
/// on [`AtomicFile::commit`]. Dropping it without committing removes the
/// temporary file.
pub struct AtomicFile {
    target: PathBuf,
    temp: PathBuf,
    file: Option<File>,
    written: u64,
}

impl AtomicFile {
    /// `<dir>/<name>.<unique>._COPYING_` for a target `<dir>/<name>`. Every
    /// call yields a fresh name, so concurrent writers never share a file.
    fn temp_path(target: &Path) -> Result<PathBuf> {
        let name = target
            .file_name()
            .ok_or_else(|| Error::MissingFileName(target.to_path_buf()))?;
        let mut temp_name = name.to_os_string();
        temp_name.push(format!(".{}{TEMP_SUFFIX}", uuid::Uuid::new_v4().simple()));
        Ok(target.with_file_name(temp_name))
    }

    pub fn is_temp_path(path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().ends_with(TEMP_SUFFIX))
            .unwrap_or(false)
    }

    pub async fn create<T: AsRef<Path>>(target: T) -> Result<Self> {
        let target = target.as_ref().to_path_buf();
        let temp = Self::temp_path(&target)?;
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp)
            .await
            .with_context(|| format!("Failed to create file {}", temp.display()))?;
        debug!(target = %target.display(), "Opened temporary file for writing");
        Ok(Self { target, temp, file: Some(file), written: 0 })
    }

    pub async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        let file = self
            .file
            .as_mut()
            .with_context(|| format!("File already closed {}", self.temp.display()))?;
        file.write_all(chunk)
            .await
            .with_context(|| format!("Failed to write file {}", self.temp.display()))?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flushes and moves the temporary file over the target. When
    /// `overwrite` is false and the target exists, the temporary file is
    /// discarded and [`Error::TargetExists`] is returned.
    pub async fn commit(mut self, overwrite: bool) -> Result<u64> {
        let Some(mut file) = self.file.take() else {
            return Err(anyhow::anyhow!("File already closed {}", self.temp.display()));
        };

        let flushed = async {
            file.flush().await?;
            file.sync_all().await
        }
        .await
        .with_context(|| format!("Failed to flush file {}", self.temp.display()));
        drop(file);

        if let Err(error) = flushed {
            self.remove_temp().await;
            return Err(error);
        }

        let moved = if overwrite {
            crate::LocalFS::rename(&self.temp, &self.target).await
        } else {
            self.move_if_absent().await
        };
        if let Err(error) = moved {
            self.remove_temp().await;
            return Err(error);
        }

        debug!(target = %self.target.display(), bytes = self.written, "Committed file");
        Ok(self.written)
    }

    pub async fn discard(mut self) -> Result<()> {
        drop(self.file.take());
        match tokio::fs::remove_file(&self.temp).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error)
                .with_context(|| format!("Failed to remove file {}", self.temp.display())),
        }
    }

    /// Links the temporary file in as the target, which fails atomically
    /// when the target exists, then drops the temporary name.
    async fn move_if_absent(&self) -> Result<()> {
        match tokio::fs::hard_link(&self.temp, &self.target).await {
            Ok(()) => {
                self.remove_temp().await;
                Ok(())
            }
            Err(error) if error.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(Error::TargetExists(self.target.clone()).into())
            }
            // Filesystems without hard links fall back to check-then-rename.
            Err(_) if crate::LocalFS::exists(&self.target) => {
                Err(Error::TargetExists(self.target.clone()).into())
            }
            Err(_) => crate::LocalFS::rename(&self.temp, &self.target).await,
        }
    }

    async fn remove_temp(&self) {
        if let Err(error) = tokio::fs::remove_file(&self.temp).await {
            if error.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.temp.display(), error = %error, "Failed to remove temporary file");
            }
        }
    }
}

impl Drop for AtomicFile {
    fn drop(&mut self) {
        if self.file.take().is_some() {
            let _ = std::fs::remove_file(&self.temp);
        }
    }
}

impl crate::LocalFS {
    /// Streams `content` into `path`, replacing it only once every chunk has
    /// been written. Any failure, from the stream or the disk, leaves the
    /// previous target untouched and removes the partial data.
    pub async fn write_stream<T, S>(path: T, content: S) -> Result<u64>
    where
        T: AsRef<Path>,
        S: Stream<Item = Result<Bytes>> + Send,
    {
        let mut content = std::pin::pin!(content);
        let mut file = AtomicFile::create(path).await?;

        while let Some(chunk) = content.next().await {
            let outcome = match chunk {
                Ok(chunk) => file.write(&chunk).await,
                Err(error) => Err(error),
            };
            if let Err(error) = outcome {
                if let Err(discard) = file.discard().await {
                    warn!(error = %discard, "Failed to discard partial file");
                }
                return Err(error);
            }
        }

        file.commit(true).await
    }
}
