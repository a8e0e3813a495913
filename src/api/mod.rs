//! HTTP client for the analysis backend
//!
//! One method per endpoint. Every call is attempted exactly once; the reply
//! body is decoded as JSON regardless of the HTTP status because the backend
//! reports failures (400/404/422/500) with JSON bodies.

mod error;
pub mod types;

pub use error::ApiError;
pub use types::*;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use url::Url;

/// Client bound to one backend base URL
#[derive(Clone, Debug)]
pub struct BackendClient {
    http: reqwest::Client,
    base: Url,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut base = Url::parse(base_url.trim()).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", base.scheme()),
            });
        }
        // Endpoint paths are joined relative to the base
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bugpatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn endpoint(&self, path: &'static str) -> Result<Url, ApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidBaseUrl {
                url: self.base.to_string(),
                reason: e.to_string(),
            })
    }

    async fn decode<T>(endpoint: &'static str, response: reqwest::Response) -> Result<T, ApiError>
    where
        T: DeserializeOwned + BackendReply,
    {
        let status = response.status().as_u16();
        let text = response.text().await?;
        let reply: T = serde_json::from_str(&text).map_err(|source| {
            tracing::warn!(endpoint, status, body = %crate::util::truncate(&text, 200), "undecodable reply");
            ApiError::Decode {
                endpoint,
                status,
                source,
            }
        })?;

        if let Some(error) = reply.backend_error() {
            tracing::warn!(endpoint, status, %error, "backend reported error");
            return Err(ApiError::Backend(error));
        }
        tracing::debug!(endpoint, status, "reply decoded");
        Ok(reply)
    }

    async fn post_json<B, T>(&self, path: &'static str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + BackendReply,
    {
        let url = self.endpoint(path)?;
        let started = Instant::now();
        let response = self.http.post(url).json(body).send().await.map_err(|e| {
            tracing::warn!(endpoint = path, error = %e, "request failed");
            ApiError::Transport(e)
        })?;
        tracing::debug!(
            endpoint = path,
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response received"
        );
        Self::decode(path, response).await
    }

    /// `POST /analyze` (form-encoded): clone and analyze a repository
    pub async fn analyze(&self, repo_url: &str) -> Result<AnalyzeResponse, ApiError> {
        let url = self.endpoint("/analyze")?;
        let started = Instant::now();
        let response = self
            .http
            .post(url)
            .form(&[("repo_url", repo_url)])
            .send()
            .await?;
        tracing::debug!(
            endpoint = "/analyze",
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response received"
        );
        Self::decode("/analyze", response).await
    }

    /// `GET /files?repo_name=owner/repo`
    pub async fn list_files(&self, repo_name: &str) -> Result<FilesResponse, ApiError> {
        let mut url = self.endpoint("/files")?;
        url.query_pairs_mut().append_pair("repo_name", repo_name);
        let response = self.http.get(url).send().await?;
        Self::decode("/files", response).await
    }

    /// `POST /file_content`: file text, findings and CK metrics
    pub async fn file_content(
        &self,
        request: &FileContentRequest,
    ) -> Result<FileContentResponse, ApiError> {
        self.post_json("/file_content", request).await
    }

    /// `POST /send_to_llm`: candidate fixes for one bug
    pub async fn send_to_llm(
        &self,
        request: &SendToLlmRequest,
    ) -> Result<SolutionsResponse, ApiError> {
        self.post_json("/send_to_llm", request).await
    }

    /// `POST /update_solution`: regenerate one candidate from user feedback
    pub async fn update_solution(
        &self,
        request: &UpdateSolutionRequest,
    ) -> Result<UpdateSolutionResponse, ApiError> {
        self.post_json("/update_solution", request).await
    }

    /// `POST /apply_solution`: write a fix into the cloned repository
    pub async fn apply_solution(
        &self,
        request: &ApplySolutionRequest,
    ) -> Result<ApplySolutionResponse, ApiError> {
        self.post_json("/apply_solution", request).await
    }

    /// `POST /calculate_metrics`: metrics of a generated solution, not applied
    pub async fn calculate_metrics(
        &self,
        request: &CalculateMetricsRequest,
    ) -> Result<CalculateMetricsResponse, ApiError> {
        self.post_json("/calculate_metrics", request).await
    }

    /// `POST /validate_patch`: rerun analysis on the patched file
    pub async fn validate_patch(
        &self,
        request: &ValidatePatchRequest,
    ) -> Result<ValidatePatchResponse, ApiError> {
        self.post_json("/validate_patch", request).await
    }

    /// `POST /commit_changes`: commit and push the patched repository
    pub async fn commit_changes(&self, request: &CommitRequest) -> Result<CommitResponse, ApiError> {
        self.post_json("/commit_changes", request).await
    }
}
