//! Transport seams between the controller and the network.
//!
//! The controller only sees two small async traits: [`ChunkSource`]
//! for push-mode byte chunks and [`StatusProbe`] for pull-mode status
//! requests. Tests inject scripted implementations; production code
//! uses the reqwest-backed implementations below.

use std::pin::Pin;

use async_trait::async_trait;
use cardforge_protocol::snapshot::PollSnapshot;
use futures::{Stream, StreamExt};

use crate::error::TransportError;

/// An async source of opaque byte chunks (push mode).
///
/// Chunks carry no alignment guarantee with logical frames; the frame
/// decoder reassembles them.
#[async_trait]
pub trait ChunkSource: Send {
    /// Next chunk, `Ok(None)` at end of stream.
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError>;
}

/// One status round-trip for a pull-mode job.
#[async_trait]
pub trait StatusProbe: Send + Sync {
    async fn fetch(&self) -> Result<PollSnapshot, TransportError>;
}

/// [`ChunkSource`] over a streaming HTTP response body.
///
/// Dropping the source drops the response, which closes the
/// connection and aborts any in-flight transfer.
pub struct HttpChunkSource {
    inner: Pin<Box<dyn Stream<Item = Result<Vec<u8>, TransportError>> + Send>>,
}

impl HttpChunkSource {
    /// Wrap a streaming response body.
    pub fn from_response(response: reqwest::Response) -> Self {
        let inner = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(TransportError::from));
        Self {
            inner: Box::pin(inner),
        }
    }
}

#[async_trait]
impl ChunkSource for HttpChunkSource {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        self.inner.next().await.transpose()
    }
}
