//! Incremental uploads.
//!
//! A [`ChunkSink`] buffers successive writes; [`put_stream`] hands one to a
//! writer closure and uploads the concatenated bytes once the writer finishes.

use bytes::{Bytes, BytesMut};
use reqwest::Url;

use crate::error::{Result, StoreError};
use crate::store::ContentStore;

/// Write side of a streamed upload.
#[derive(Debug, Default)]
pub struct ChunkSink {
    chunks: Vec<Bytes>,
    finished: bool,
}

impl ChunkSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk.
    ///
    /// Returns whether further writes may proceed. Once the sink is finished
    /// the chunk is rejected and `false` is returned.
    pub fn write(&mut self, chunk: impl Into<Bytes>) -> bool {
        if self.finished {
            return false;
        }
        self.chunks.push(chunk.into());
        true
    }

    /// Mark the stream complete.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Write a trailing chunk, then finish.
    pub fn finish_with(&mut self, chunk: impl Into<Bytes>) {
        self.write(chunk);
        self.finish();
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Total buffered length in bytes.
    pub fn len(&self) -> usize {
        self.chunks.iter().map(Bytes::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenate all chunks in the order they were written.
    pub fn into_bytes(self) -> Bytes {
        let mut file = BytesMut::with_capacity(self.len());
        for chunk in &self.chunks {
            file.extend_from_slice(chunk);
        }
        file.freeze()
    }
}

/// Stream content into `store` under `path`.
///
/// The writer receives a fresh [`ChunkSink`]. When it returns, the buffered
/// chunks are uploaded as one request and the URL is returned after the
/// store accepts it. A writer that never finishes the sink uploads nothing.
pub async fn put_stream<S, F>(store: &S, path: &str, write: F) -> Result<Url>
where
    S: ContentStore + ?Sized,
    F: FnOnce(&mut ChunkSink),
{
    let mut sink = ChunkSink::new();
    write(&mut sink);

    if !sink.is_finished() {
        return Err(StoreError::StreamNotFinished(path.to_string()));
    }

    tracing::debug!("Streaming {} bytes to {}", sink.len(), path);
    store.put(path, sink.into_bytes()).await
}
