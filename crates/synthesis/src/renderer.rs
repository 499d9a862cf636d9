//! HTTP client for the external post-production renderer.
//!
//! The renderer measures observed image metrics and applies the
//! corrective plan. One pass only: the pipeline does not re-validate
//! the processed output.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thumbforge_core::postprod::PostProductionPlan;
use thumbforge_core::quality::ImageMetrics;

use crate::error::RenderError;

/// Default per-request deadline for renderer calls.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(60);

/// Response of a successful render pass.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderedImage {
    pub processed_url: String,
}

/// Call boundary to the post-production renderer.
#[async_trait]
pub trait PostRenderer: Send + Sync {
    /// Measure observed quality metrics for an image. Best-effort: any
    /// subset of metrics may come back.
    async fn measure(&self, url: &str) -> Result<ImageMetrics, RenderError>;

    /// Apply a corrective plan, returning the processed image URL.
    async fn apply(&self, url: &str, plan: &PostProductionPlan) -> Result<String, RenderError>;
}

/// reqwest-backed renderer client.
pub struct RenderApi {
    client: reqwest::Client,
    api_url: String,
}

impl RenderApi {
    pub fn new(api_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_RENDER_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client, api_url }
    }

    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    /// Transport failures mean the renderer is unreachable — fatal for
    /// the pipeline. Non-2xx responses are render rejections the
    /// caller can fall back from.
    fn classify_transport(e: reqwest::Error) -> RenderError {
        RenderError::Unreachable(e.to_string())
    }

    async fn reject_from_status(response: reqwest::Response) -> RenderError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        RenderError::Rejected(format!("{status}: {body}"))
    }
}

#[async_trait]
impl PostRenderer for RenderApi {
    /// Request metric extraction via `POST /v1/measure`.
    async fn measure(&self, url: &str) -> Result<ImageMetrics, RenderError> {
        let response = self
            .client
            .post(format!("{}/v1/measure", self.api_url))
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await
            .map_err(Self::classify_transport)?;

        if !response.status().is_success() {
            return Err(Self::reject_from_status(response).await);
        }

        response
            .json::<ImageMetrics>()
            .await
            .map_err(|e| RenderError::Rejected(format!("Malformed metrics response: {e}")))
    }

    /// Apply a plan via `POST /v1/render`.
    async fn apply(&self, url: &str, plan: &PostProductionPlan) -> Result<String, RenderError> {
        let body = serde_json::json!({
            "url": url,
            "plan": plan,
        });

        let response = self
            .client
            .post(format!("{}/v1/render", self.api_url))
            .json(&body)
            .send()
            .await
            .map_err(Self::classify_transport)?;

        if !response.status().is_success() {
            return Err(Self::reject_from_status(response).await);
        }

        response
            .json::<RenderedImage>()
            .await
            .map(|r| r.processed_url)
            .map_err(|e| RenderError::Rejected(format!("Malformed render response: {e}")))
    }
}
