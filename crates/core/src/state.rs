//! Accumulated, UI-facing job state.
//!
//! [`JobState`] is the read-only snapshot the UI subscribes to. It is
//! only ever mutated by the reducer in [`crate::reducer`]; every other
//! component sees immutable clones.

use serde::Serialize;

/// Partial analysis results, filled in as `analysis` events arrive.
///
/// Fields merge last-write-wins and never regress: an event carrying
/// `None` for a field leaves the previously known value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub page_count: Option<u32>,
    pub target_audience: Option<String>,
    pub tone: Option<String>,
    pub business_meta: Option<serde_json::Value>,
}

/// One fully generated unit (a finished card), positioned by its
/// `index` field rather than arrival order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedItem {
    pub index: u32,
    pub title: String,
    pub payload: serde_json::Value,
}

/// Terminal result of a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "result")]
pub enum JobOutcome {
    /// The server reported success, with an optional summary payload.
    #[serde(rename = "success")]
    Success { summary: serde_json::Value },

    /// The job failed. `timed_out` marks a client-synthesized timeout
    /// as opposed to a server-reported failure.
    #[serde(rename = "failure")]
    Failure { message: String, timed_out: bool },
}

/// The reconstruction of a job's progress from its event sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobState {
    /// Latest status line, replaced by each `status` event.
    pub status: String,
    /// Ordered log of every event received, for audit/progress display.
    pub log: Vec<String>,
    /// Partial analysis, merged across `analysis` events.
    pub analysis: AnalysisSummary,
    /// Completed items, ordered by their `index` field.
    pub items: Vec<CompletedItem>,
    /// Terminal result, if the job has finished.
    pub outcome: Option<JobOutcome>,
}

impl JobState {
    /// Whether a terminal event has been applied. Once true, the
    /// reducer ignores all further events.
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }
}
