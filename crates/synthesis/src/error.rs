//! Typed failures for the external service boundaries.

/// Failure classes of the image-generation service.
///
/// Only [`RateLimited`](Self::RateLimited) and
/// [`Timeout`](Self::Timeout) are retryable; the other classes
/// propagate immediately.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("Synthesis rate limited: {0}")]
    RateLimited(String),

    #[error("Prompt rejected by content policy: {0}")]
    ContentRejected(String),

    #[error("Synthesis request timed out: {0}")]
    Timeout(String),

    #[error("Synthesis failed: {0}")]
    Unknown(String),
}

impl SynthesisError {
    /// Whether the retry wrapper may attempt this call again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Timeout(_))
    }

    /// Stable class label for logs and failure records.
    pub fn class(&self) -> &'static str {
        match self {
            Self::RateLimited(_) => "rate_limited",
            Self::ContentRejected(_) => "content_rejected",
            Self::Timeout(_) => "timeout",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// Failures of the vision/LLM analysis service. Analysis is
/// best-effort: callers degrade to prompt-derived hints.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Analysis service unavailable: {0}")]
    Unavailable(String),

    #[error("Analysis response malformed: {0}")]
    Malformed(String),
}

/// Failures of the post-production renderer.
///
/// [`Unreachable`](Self::Unreachable) is fatal for the pipeline (the
/// user should not pay for an unusable asset); a
/// [`Rejected`](Self::Rejected) render falls back to the unprocessed
/// image.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Renderer unreachable: {0}")]
    Unreachable(String),

    #[error("Render rejected: {0}")]
    Rejected(String),
}
