//! Job runtime for the Cardforge dashboard client.
//!
//! Owns the lifecycle of long-running generation/analysis jobs: the
//! HTTP transports (streamed frames for push mode, periodic status
//! requests for pull mode), the per-job controller with its timeout
//! and cancellation discipline, and the publication of evolving job
//! state to UI subscribers.

pub mod api;
pub mod controller;
pub mod error;
pub mod poll;
pub mod stream;
pub mod transport;
