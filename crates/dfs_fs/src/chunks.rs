use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::Bytes;
use futures::Stream;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::error::Error;

impl crate::LocalFS {
    /// Opens a file and yields its content in chunks of exactly `chunk_size`
    /// bytes (the last one may be shorter). The file is opened eagerly so a
    /// missing source fails here rather than on the first poll.
    pub async fn read_chunks<T: AsRef<Path>>(
        path: T,
        chunk_size: usize,
    ) -> Result<impl Stream<Item = Result<Bytes>> + Send + 'static> {
        if chunk_size == 0 {
            return Err(Error::ZeroChunkSize.into());
        }

        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .await
            .with_context(|| format!("Failed to open file {}", path.display()))?;

        Ok(futures::stream::try_unfold(
            (file, path),
            move |(mut file, path): (File, PathBuf)| async move {
                let mut buf = vec![0; chunk_size];
                let mut filled = 0;
                while filled < chunk_size {
                    let read = file
                        .read(&mut buf[filled..])
                        .await
                        .with_context(|| format!("Failed to read file {}", path.display()))?;
                    if read == 0 {
                        break;
                    }
                    filled += read;
                }

                if filled == 0 {
                    return Ok(None);
                }
                buf.truncate(filled);
                Ok::<_, anyhow::Error>(Some((Bytes::from(buf), (file, path))))
            },
        ))
    }
}
