//! HTTP client for the dashboard's generation/analysis endpoints.
//!
//! [`DashboardApi`] wraps the backend REST surface with [`reqwest`]:
//! opening a push-mode generation stream and fetching pull-mode status
//! snapshots. Endpoint paths are job-kind-specific (the status schema
//! varies per kind, so callers resolve paths through [`paths`]).

use cardforge_core::types::JobKind;
use cardforge_protocol::snapshot::PollSnapshot;

use crate::error::TransportError;
use crate::transport::{HttpChunkSource, StatusProbe};

/// HTTP client for one dashboard backend.
#[derive(Clone)]
pub struct DashboardApi {
    client: reqwest::Client,
    base_url: String,
}

impl DashboardApi {
    /// Create a new API client.
    ///
    /// * `base_url` - Base HTTP URL, e.g. `https://api.example.com`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across jobs).
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Open a push-mode generation stream.
    ///
    /// Sends a `POST` with the generation request and returns a
    /// [`HttpChunkSource`] over the streaming response body. A non-2xx
    /// response is surfaced immediately as a transport error.
    pub async fn open_stream(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<HttpChunkSource, TransportError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Ok(HttpChunkSource::from_response(response))
    }

    /// Fetch one pull-mode status snapshot.
    pub async fn fetch_snapshot(&self, path: &str) -> Result<PollSnapshot, TransportError> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Build a [`StatusProbe`] bound to one status path.
    pub fn status_probe(&self, path: impl Into<String>) -> HttpStatusProbe {
        HttpStatusProbe {
            api: self.clone(),
            path: path.into(),
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// [`StatusProbe`] backed by [`DashboardApi::fetch_snapshot`].
pub struct HttpStatusProbe {
    api: DashboardApi,
    path: String,
}

#[async_trait::async_trait]
impl StatusProbe for HttpStatusProbe {
    async fn fetch(&self) -> Result<PollSnapshot, TransportError> {
        self.api.fetch_snapshot(&self.path).await
    }
}

/// Endpoint paths per job kind.
pub mod paths {
    use super::JobKind;

    /// Streaming generation endpoint for push-mode kinds.
    pub fn generation(kind: JobKind) -> Option<&'static str> {
        match kind {
            JobKind::CardNews => Some("/api/card-news/generate"),
            JobKind::BrandAnalysis | JobKind::ManualBrandAnalysis | JobKind::BlogAnalysis => None,
        }
    }

    /// Status endpoint for pull-mode kinds, keyed by the server-side
    /// job reference.
    pub fn status(kind: JobKind, job_ref: &str) -> Option<String> {
        match kind {
            JobKind::CardNews => None,
            JobKind::BrandAnalysis => Some(format!("/api/brand-analysis/{job_ref}/status")),
            JobKind::ManualBrandAnalysis => {
                Some(format!("/api/brand-analysis/manual/{job_ref}/status"))
            }
            JobKind::BlogAnalysis => Some(format!("/api/blog-analysis/{job_ref}/status")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_path_exists_only_for_push_kinds() {
        assert_eq!(
            paths::generation(JobKind::CardNews),
            Some("/api/card-news/generate")
        );
        assert_eq!(paths::generation(JobKind::BrandAnalysis), None);
        assert_eq!(paths::generation(JobKind::BlogAnalysis), None);
    }

    #[test]
    fn status_paths_exist_only_for_pull_kinds() {
        assert_eq!(paths::status(JobKind::CardNews, "j1"), None);
        assert_eq!(
            paths::status(JobKind::BrandAnalysis, "j1").as_deref(),
            Some("/api/brand-analysis/j1/status")
        );
        assert_eq!(
            paths::status(JobKind::ManualBrandAnalysis, "j1").as_deref(),
            Some("/api/brand-analysis/manual/j1/status")
        );
        assert_eq!(
            paths::status(JobKind::BlogAnalysis, "j1").as_deref(),
            Some("/api/blog-analysis/j1/status")
        );
    }
}
