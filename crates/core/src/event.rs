//! The typed job-progress event union.
//!
//! Both transports produce the same vocabulary: push mode parses these
//! straight off the wire (`{"type": "<kind>", ...}` with camelCase
//! payload fields), pull mode synthesizes them from status snapshots.
//! Events are immutable and ordered only by their position in the
//! sequence; the same kind may occur many times (once per page, card,
//! or log line).

use serde::{Deserialize, Serialize};

/// One unit of job-progress information, transport-independent.
///
/// Deserialized via the internally-tagged `"type"` field. Unknown type
/// values fail deserialization; the frame parser drops those frames
/// without aborting the job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JobEvent {
    /// Human-readable progress line ("analyzing brand voice...").
    #[serde(rename = "status")]
    Status { message: String },

    /// Partial analysis results; fields fill in across multiple events.
    #[serde(rename = "analysis", rename_all = "camelCase")]
    Analysis {
        #[serde(default)]
        page_count: Option<u32>,
        #[serde(default)]
        target_audience: Option<String>,
        #[serde(default)]
        tone: Option<String>,
        #[serde(default)]
        business_meta: Option<serde_json::Value>,
    },

    /// The plan for one page/card has been decided.
    #[serde(rename = "page_planned", rename_all = "camelCase")]
    PagePlanned {
        page_index: u32,
        title: String,
        content: String,
    },

    /// An image prompt was generated for a page.
    #[serde(rename = "prompt_generated", rename_all = "camelCase")]
    PromptGenerated { page_index: u32, prompt: String },

    /// Self-evaluation score for the generated plan.
    #[serde(rename = "quality_report")]
    QualityReport { score: f64 },

    /// The image for a page finished rendering.
    #[serde(rename = "image_generated", rename_all = "camelCase")]
    ImageGenerated { page_index: u32 },

    /// One fully generated unit (a finished card). `index` is the
    /// card's position in the final deck, not its arrival order.
    #[serde(rename = "card", alias = "item")]
    Card {
        index: u32,
        title: String,
        payload: serde_json::Value,
    },

    /// Terminal success with an optional summary payload.
    #[serde(rename = "complete")]
    Complete {
        #[serde(default)]
        summary: serde_json::Value,
    },

    /// Terminal failure. `timed_out` is never set by the server; only
    /// client-synthesized timeout errors carry it, so the UI can tell
    /// "try again" apart from "contact support".
    #[serde(rename = "error", rename_all = "camelCase")]
    Error {
        message: String,
        #[serde(default)]
        timed_out: bool,
    },
}

impl JobEvent {
    /// Whether this event ends the job (success or failure).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobEvent::Complete { .. } | JobEvent::Error { .. })
    }

    /// Client-originated timeout error, distinguishable from a
    /// server-reported failure.
    pub fn timeout_error(message: impl Into<String>) -> Self {
        JobEvent::Error {
            message: message.into(),
            timed_out: true,
        }
    }
}
