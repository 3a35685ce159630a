//! Newline frame reassembly for push-mode streams.
//!
//! Transport chunks have no alignment with logical frames: one chunk
//! may carry zero, one, or many terminators, and one frame may span
//! many chunks. [`FrameDecoder`] buffers the trailing partial line
//! across chunk boundaries so the frame sequence is identical for any
//! chunking of the same byte stream.

/// Upper bound on one frame's length. A line that exceeds this is
/// dropped in the same log-and-continue style as a malformed frame,
/// and it also caps the partial-line buffer so a producer that never
/// terminates a line cannot grow memory without bound.
pub const MAX_FRAME_LEN: usize = 256 * 1024;

/// Stateful decoder turning opaque byte chunks into complete frames.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Bytes after the last terminator seen so far. Kept as raw bytes
    /// so a multi-byte UTF-8 character split across chunks survives.
    buffer: Vec<u8>,
    /// Set once the partial line overflows [`MAX_FRAME_LEN`]; bytes
    /// are discarded until the next terminator.
    skipping_oversized: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and collect every frame it completes, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if self.skipping_oversized {
                // Tail of a line whose head was already discarded.
                self.skipping_oversized = false;
                continue;
            }
            // Drop the terminator (and a preceding \r from CRLF producers).
            let line = &line[..pos];
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.len() > MAX_FRAME_LEN {
                tracing::debug!(frame_len = line.len(), "Dropping oversized frame");
                continue;
            }
            frames.push(String::from_utf8_lossy(line).into_owned());
        }

        if self.skipping_oversized {
            self.buffer.clear();
        } else if self.buffer.len() > MAX_FRAME_LEN {
            tracing::debug!(
                buffered_bytes = self.buffer.len(),
                "Partial line exceeds the frame limit, discarding until the next terminator",
            );
            self.buffer.clear();
            self.skipping_oversized = true;
        }
        frames
    }

    /// Signal end of stream.
    ///
    /// A trailing unterminated frame is not a protocol violation, but
    /// it is not emitted either: a well-behaved producer always ends
    /// with a newline-terminated terminal frame.
    pub fn finish(&mut self) {
        if !self.buffer.is_empty() {
            tracing::debug!(
                discarded_bytes = self.buffer.len(),
                "Discarding unterminated trailing frame at end of stream",
            );
            self.buffer.clear();
        }
        self.skipping_oversized = false;
    }
}
