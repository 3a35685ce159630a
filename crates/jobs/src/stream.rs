//! Push-mode reader loop.
//!
//! Pulls chunks from a [`ChunkSource`], reassembles frames with the
//! protocol decoder, parses each frame, and forwards parsed events in
//! arrival order. Malformed or unrecognized frames are dropped by the
//! parser and never abort the job.

use cardforge_core::event::JobEvent;
use cardforge_protocol::decoder::FrameDecoder;
use cardforge_protocol::parser::parse_frame;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::transport::ChunkSource;

/// Read a push stream until a terminal event, EOF, transport error, or
/// cancellation.
///
/// After forwarding a terminal event the source is dropped without
/// draining the rest of the stream; the reducer ignores anything a
/// slow producer might still have sent.
pub async fn run_push<S: ChunkSource>(
    mut source: S,
    events: mpsc::Sender<JobEvent>,
    cancel: CancellationToken,
) {
    let mut decoder = FrameDecoder::new();

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::debug!("Push reader cancelled");
                return;
            }

            chunk = source.next_chunk() => match chunk {
                Ok(Some(chunk)) => {
                    for frame in decoder.push(&chunk) {
                        let Some(event) = parse_frame(&frame) else {
                            continue;
                        };
                        let terminal = event.is_terminal();
                        if events.send(event).await.is_err() {
                            return;
                        }
                        if terminal {
                            return;
                        }
                    }
                }
                Ok(None) => {
                    decoder.finish();
                    tracing::debug!("Push stream ended without a terminal frame");
                    return;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Push stream transport error");
                    let _ = events
                        .send(JobEvent::Error {
                            message: format!("Stream transport error: {e}"),
                            timed_out: false,
                        })
                        .await;
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use assert_matches::assert_matches;
    use std::collections::VecDeque;

    /// Source that replays a fixed chunk script, then EOF or an error.
    struct ScriptedSource {
        chunks: VecDeque<Vec<u8>>,
        trailing_error: Option<TransportError>,
    }

    impl ScriptedSource {
        fn from_bytes(data: &[u8], chunk_size: usize) -> Self {
            Self {
                chunks: data.chunks(chunk_size).map(<[u8]>::to_vec).collect(),
                trailing_error: None,
            }
        }
    }

    #[async_trait::async_trait]
    impl ChunkSource for ScriptedSource {
        async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
            if let Some(chunk) = self.chunks.pop_front() {
                return Ok(Some(chunk));
            }
            match self.trailing_error.take() {
                Some(e) => Err(e),
                None => Ok(None),
            }
        }
    }

    async fn collect_events(source: ScriptedSource) -> Vec<JobEvent> {
        let (tx, mut rx) = mpsc::channel(64);
        let reader = tokio::spawn(run_push(source, tx, CancellationToken::new()));

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        reader.await.unwrap();
        events
    }

    const STREAM: &[u8] = b"data: {\"type\":\"status\",\"message\":\"starting\"}\n\
data: {\"type\":\"card\",\"index\":0,\"title\":\"Hook\",\"payload\":{}}\n\
data: {\"type\":\"complete\",\"summary\":{\"count\":1}}\n";

    #[tokio::test]
    async fn forwards_events_in_order() {
        let events = collect_events(ScriptedSource::from_bytes(STREAM, STREAM.len())).await;
        assert_eq!(events.len(), 3);
        assert_matches!(&events[0], JobEvent::Status { .. });
        assert_matches!(&events[1], JobEvent::Card { index: 0, .. });
        assert_matches!(&events[2], JobEvent::Complete { .. });
    }

    #[tokio::test]
    async fn chunking_does_not_change_the_events() {
        let whole = collect_events(ScriptedSource::from_bytes(STREAM, STREAM.len())).await;
        for chunk_size in [1, 2, 7, 64] {
            let chunked =
                collect_events(ScriptedSource::from_bytes(STREAM, chunk_size)).await;
            assert_eq!(chunked, whole, "chunk_size={chunk_size}");
        }
    }

    #[tokio::test]
    async fn garbage_lines_are_skipped() {
        let noisy = b"garbage line\n\
data: {\"type\":\"status\",\"message\":\"ok\"}\n\
data: not json\n\
: sse comment\n\
data: {\"type\":\"complete\"}\n";
        let events = collect_events(ScriptedSource::from_bytes(noisy, 11)).await;
        assert_eq!(events.len(), 2);
        assert_matches!(&events[0], JobEvent::Status { .. });
        assert_matches!(&events[1], JobEvent::Complete { .. });
    }

    #[tokio::test]
    async fn eof_without_terminal_frame_just_closes_the_channel() {
        let data = b"data: {\"type\":\"status\",\"message\":\"working\"}\n";
        let events = collect_events(ScriptedSource::from_bytes(data, data.len())).await;
        assert_eq!(events.len(), 1);
        assert!(!events[0].is_terminal());
    }

    #[tokio::test]
    async fn transport_error_becomes_a_terminal_event() {
        let mut source = ScriptedSource::from_bytes(
            b"data: {\"type\":\"status\",\"message\":\"working\"}\n",
            64,
        );
        source.trailing_error = Some(TransportError::Status {
            status: 500,
            body: "boom".to_string(),
        });

        let events = collect_events(source).await;
        assert_eq!(events.len(), 2);
        assert_matches!(&events[1], JobEvent::Error { timed_out: false, .. });
    }

    #[tokio::test]
    async fn stops_reading_after_a_terminal_frame() {
        // A card after `complete` is never forwarded.
        let data = b"data: {\"type\":\"complete\"}\n\
data: {\"type\":\"card\",\"index\":0,\"title\":\"late\",\"payload\":{}}\n";
        let events = collect_events(ScriptedSource::from_bytes(data, data.len())).await;
        assert_eq!(events.len(), 1);
        assert_matches!(&events[0], JobEvent::Complete { .. });
    }
}
