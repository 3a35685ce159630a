//! Error types for the job runtime.

use cardforge_core::types::JobKind;

/// Errors from the HTTP transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("Server returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Errors from the job controller.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// `start` was called on a controller that already left `Idle`.
    #[error("Job already started")]
    AlreadyStarted,

    /// `cancel` was called on a job that is not running.
    #[error("Job is not running")]
    NotRunning,

    /// The chosen transport does not match the job kind's mode.
    #[error("Job kind '{kind}' does not use this transport")]
    TransportMismatch { kind: JobKind },

    /// The provided input does not fit the job kind.
    #[error("Invalid input for job kind '{kind}': {reason}")]
    InvalidInput { kind: JobKind, reason: String },

    /// Starting the transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
