//! Wire-level protocol for job-progress transports.
//!
//! Push mode: a streaming response body carrying newline-delimited
//! `data: {...}` frames, reassembled by [`decoder::FrameDecoder`] and
//! parsed by [`parser::parse_frame`]. Pull mode: periodic status
//! responses interpreted by [`snapshot::interpret`]. Both ends of the
//! protocol speak the same [`cardforge_core::event::JobEvent`] union.

pub mod decoder;
pub mod parser;
pub mod snapshot;
