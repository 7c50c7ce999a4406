use anyhow::Result;
use bytes::Bytes;
use dfs_domain::ByteStream;
use futures::{Stream, StreamExt};
use tracing::warn;

use crate::ByteSink;

/// Drains `content` into `sink` and commits it. If the stream or the sink
/// fails part-way, the sink is aborted so no partial target is left.
/// Returns the number of bytes written.
pub async fn pump<S>(content: S, mut sink: Box<dyn ByteSink>) -> Result<u64>
where
    S: Stream<Item = Result<Bytes>> + Send,
{
    let mut content = std::pin::pin!(content);
    let mut written = 0u64;

    while let Some(chunk) = content.next().await {
        let outcome = match chunk {
            Ok(chunk) => {
                written += chunk.len() as u64;
                sink.write(chunk).await
            }
            Err(error) => Err(error),
        };

        if let Err(error) = outcome {
            if let Err(abort) = sink.abort().await {
                warn!(error = %abort, "Failed to abort partial write");
            }
            return Err(error);
        }
    }

    sink.close().await?;
    Ok(written)
}

/// Serves an in-memory buffer as a stream of `chunk_size` slices. The slices
/// share the buffer, nothing is copied.
pub fn chunked(content: Bytes, chunk_size: usize) -> ByteStream {
    let chunk_size = chunk_size.max(1);
    let chunks = (0..content.len())
        .step_by(chunk_size)
        .map(|start| Ok(content.slice(start..(start + chunk_size).min(content.len()))))
        .collect::<Vec<_>>();
    Box::pin(futures::stream::iter(chunks))
}
