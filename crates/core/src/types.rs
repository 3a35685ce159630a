//! Job kinds, transport modes, and the client-enforced timeout table.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// How progress for a job reaches the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// The server streams newline-delimited frames over one open connection.
    Push,
    /// The client polls a status endpoint on a fixed interval.
    Pull,
}

/// The kinds of long-running generation/analysis jobs the dashboard runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    /// Multi-stage card-news generation (streamed).
    CardNews,
    /// Multi-platform brand/style analysis (polled).
    BrandAnalysis,
    /// Brand analysis over manually pasted content (polled).
    ManualBrandAnalysis,
    /// Legacy single-platform blog analysis (polled).
    BlogAnalysis,
}

impl JobKind {
    /// Transport used for this kind of job.
    pub fn transport_mode(&self) -> TransportMode {
        match self {
            JobKind::CardNews => TransportMode::Push,
            JobKind::BrandAnalysis
            | JobKind::ManualBrandAnalysis
            | JobKind::BlogAnalysis => TransportMode::Pull,
        }
    }

    /// Poll interval for pull-mode kinds; `None` for push-mode kinds.
    pub fn poll_interval(&self) -> Option<Duration> {
        match self {
            JobKind::CardNews => None,
            JobKind::BrandAnalysis | JobKind::ManualBrandAnalysis => {
                Some(Duration::from_secs(5))
            }
            JobKind::BlogAnalysis => Some(Duration::from_secs(3)),
        }
    }

    /// Hard wall-clock timeout enforced by the client, not the server.
    ///
    /// Generation jobs get the longest window because image synthesis
    /// dominates their runtime.
    pub fn timeout(&self) -> Duration {
        match self {
            JobKind::CardNews => Duration::from_secs(360),
            JobKind::BrandAnalysis | JobKind::ManualBrandAnalysis => {
                Duration::from_secs(300)
            }
            JobKind::BlogAnalysis => Duration::from_secs(120),
        }
    }

    /// Stable kebab-case name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::CardNews => "card-news",
            JobKind::BrandAnalysis => "brand-analysis",
            JobKind::ManualBrandAnalysis => "manual-brand-analysis",
            JobKind::BlogAnalysis => "blog-analysis",
        }
    }
}

impl FromStr for JobKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card-news" => Ok(JobKind::CardNews),
            "brand-analysis" => Ok(JobKind::BrandAnalysis),
            "manual-brand-analysis" => Ok(JobKind::ManualBrandAnalysis),
            "blog-analysis" => Ok(JobKind::BlogAnalysis),
            other => Err(CoreError::UnknownJobKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
