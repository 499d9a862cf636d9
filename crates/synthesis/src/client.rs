//! HTTP client for the external image-generation service.
//!
//! The service contract is deliberately thin: submit `{prompt, model}`,
//! receive `{url}` or a typed failure. Everything behind that boundary
//! (queueing, GPUs, model weights) is the collaborator's problem.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thumbforge_core::request::ImageModel;

use crate::error::SynthesisError;

/// Default per-request deadline for synthesis calls.
pub const DEFAULT_SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(120);

/// The opaque result of one synthesis call. The URL is never mutated,
/// only referenced.
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesizedImage {
    pub url: String,
}

/// Call boundary to the image-generation service.
#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        prompt: &str,
        model: ImageModel,
    ) -> Result<SynthesizedImage, SynthesisError>;
}

/// reqwest-backed synthesis client.
pub struct SynthesisApi {
    client: reqwest::Client,
    api_url: String,
}

impl SynthesisApi {
    /// Create a client for the service at `api_url` (e.g.
    /// `https://images.example.com`).
    pub fn new(api_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_SYNTHESIS_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client, api_url }
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across adapters).
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    /// Classify a transport-level failure.
    fn classify_transport(e: reqwest::Error) -> SynthesisError {
        if e.is_timeout() {
            SynthesisError::Timeout(e.to_string())
        } else {
            SynthesisError::Unknown(e.to_string())
        }
    }

    /// Classify a non-2xx response by status code.
    async fn classify_status(response: reqwest::Response) -> SynthesisError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        match status.as_u16() {
            429 => SynthesisError::RateLimited(body),
            400 | 422 => SynthesisError::ContentRejected(body),
            408 | 504 => SynthesisError::Timeout(body),
            _ => SynthesisError::Unknown(format!("{status}: {body}")),
        }
    }
}

#[async_trait]
impl ImageSynthesizer for SynthesisApi {
    /// Submit a prompt for synthesis via `POST /v1/images`.
    async fn synthesize(
        &self,
        prompt: &str,
        model: ImageModel,
    ) -> Result<SynthesizedImage, SynthesisError> {
        let body = serde_json::json!({
            "prompt": prompt,
            "model": model.as_str(),
        });

        let response = self
            .client
            .post(format!("{}/v1/images", self.api_url))
            .json(&body)
            .send()
            .await
            .map_err(Self::classify_transport)?;

        if !response.status().is_success() {
            return Err(Self::classify_status(response).await);
        }

        response
            .json::<SynthesizedImage>()
            .await
            .map_err(|e| SynthesisError::Unknown(format!("Malformed synthesis response: {e}")))
    }
}
