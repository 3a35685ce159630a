//! Pull-mode status snapshot interpretation.
//!
//! The status endpoint's response shape varies by job kind, so the
//! snapshot is deliberately loose: a status string plus an optional
//! nested result object. [`interpret`] maps each snapshot to zero or
//! one synthesized [`JobEvent`], keeping the pull transport on the
//! same reducer path as push mode.

use cardforge_core::event::JobEvent;
use serde::Deserialize;

/// Raw response from a pull-mode status endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PollSnapshot {
    /// Coarse server-side status string, when the endpoint has one.
    #[serde(default)]
    pub status: Option<String>,
    /// Human-readable progress or error detail.
    #[serde(default)]
    pub message: Option<String>,
    /// Nested result object; populated only once analysis finishes.
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

impl PollSnapshot {
    /// Whether the nested result carries the completion marker.
    ///
    /// The wire contract signals completion through the *presence* of a
    /// populated `tone` field inside `result` rather than an explicit
    /// done flag. That is an inherited contract from incremental API
    /// evolution, not a designed one; it is kept for compatibility and
    /// isolated here. An explicit `status: "completed"` is accepted as
    /// well so a server that grows a real status field works unchanged.
    fn has_completion_marker(&self) -> bool {
        self.result
            .as_ref()
            .map(|r| !r["tone"].is_null())
            .unwrap_or(false)
    }

    fn is_failed(&self) -> bool {
        matches!(self.status.as_deref(), Some("failed") | Some("error"))
    }

    fn is_completed(&self) -> bool {
        self.has_completion_marker() || self.status.as_deref() == Some("completed")
    }
}

/// Map one status response to zero or one synthesized event.
///
/// Failure wins over completion if a confused server reports both.
pub fn interpret(snapshot: &PollSnapshot) -> Option<JobEvent> {
    if snapshot.is_failed() {
        return Some(JobEvent::Error {
            message: snapshot
                .message
                .clone()
                .unwrap_or_else(|| "Analysis failed".to_string()),
            timed_out: false,
        });
    }

    if snapshot.is_completed() {
        return Some(JobEvent::Complete {
            summary: snapshot.result.clone().unwrap_or(serde_json::Value::Null),
        });
    }

    snapshot
        .status
        .as_ref()
        .map(|status| JobEvent::Status {
            message: snapshot.message.clone().unwrap_or_else(|| status.clone()),
        })
}
