use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;

/// A lazy, finite, forward-only sequence of content chunks. Not restartable;
/// dropping it releases whatever the producer holds open.
pub type ByteStream = Pin<Box<dyn Stream<Item = anyhow::Result<Bytes>> + Send>>;
