//! Byte streams passed between the renderer and the file store.
//!
//! A stream is owned by exactly one consumer at a time: the next render step or the
//! store. Dropping it discards the remaining data.

use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream, StreamExt};
use std::io;
use std::pin::Pin;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, io::Error>> + Send>>;

/// Wrap an in-memory buffer as a single-chunk stream.
pub fn from_bytes(data: impl Into<Bytes>) -> ByteStream {
    let data = data.into();
    Box::pin(stream::once(async move { Ok(data) }))
}

/// Drain a stream into one contiguous buffer.
pub async fn collect(mut stream: ByteStream) -> Result<Bytes, io::Error> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf.freeze())
}
