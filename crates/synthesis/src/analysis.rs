//! HTTP client for the vision/LLM analysis service.
//!
//! Analysis is best-effort: the service may return any subset of the
//! metadata fields, and callers degrade to prompt-derived keyword
//! hints when it is unavailable.

use std::time::Duration;

use async_trait::async_trait;
use thumbforge_core::metadata::UserMetadata;

use crate::error::AnalysisError;

/// Default per-request deadline for analysis calls.
pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);

/// Call boundary to the vision/LLM analysis service.
#[async_trait]
pub trait PromptAnalyzer: Send + Sync {
    /// Derive structural descriptors from a prompt and optional
    /// uploaded images. Partial results are acceptable.
    async fn analyze(
        &self,
        prompt: &str,
        image_refs: &[String],
    ) -> Result<UserMetadata, AnalysisError>;
}

/// reqwest-backed analysis client.
pub struct VisionApi {
    client: reqwest::Client,
    api_url: String,
}

impl VisionApi {
    pub fn new(api_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_ANALYSIS_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client, api_url }
    }

    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }
}

#[async_trait]
impl PromptAnalyzer for VisionApi {
    /// Request descriptor extraction via `POST /v1/analyze`.
    async fn analyze(
        &self,
        prompt: &str,
        image_refs: &[String],
    ) -> Result<UserMetadata, AnalysisError> {
        let body = serde_json::json!({
            "prompt": prompt,
            "images": image_refs,
        });

        let response = self
            .client
            .post(format!("{}/v1/analyze", self.api_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalysisError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AnalysisError::Unavailable(format!("{status}: {body}")));
        }

        response
            .json::<UserMetadata>()
            .await
            .map_err(|e| AnalysisError::Malformed(e.to_string()))
    }
}
