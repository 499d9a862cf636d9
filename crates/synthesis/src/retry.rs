//! Bounded exponential-backoff retry for synthesis calls.
//!
//! Only `rate_limited` and `timeout` failures are retried;
//! `content_rejected` and `unknown` propagate immediately. The
//! orchestrator has exactly one synthesis call site, so at most one
//! successful image is produced per generation record.

use std::time::Duration;

use thumbforge_core::request::ImageModel;

use crate::client::{ImageSynthesizer, SynthesizedImage};
use crate::error::SynthesisError;

/// Tunable parameters for the retry strategy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first (minimum 1).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            multiplier: 2.0,
        }
    }
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`RetryConfig::max_delay`].
pub fn next_delay(current: Duration, config: &RetryConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Invoke the synthesizer with bounded retry.
///
/// Retryable failures sleep and try again until the attempt budget is
/// exhausted; the final error is surfaced as-is. Non-retryable
/// failures return on the first occurrence.
pub async fn synthesize_with_retry(
    synthesizer: &dyn ImageSynthesizer,
    prompt: &str,
    model: ImageModel,
    config: &RetryConfig,
) -> Result<SynthesizedImage, SynthesisError> {
    let max_attempts = config.max_attempts.max(1);
    let mut delay = config.initial_delay;

    for attempt in 1..=max_attempts {
        match synthesizer.synthesize(prompt, model).await {
            Ok(image) => {
                if attempt > 1 {
                    tracing::info!(attempt, "Synthesis succeeded after retry");
                }
                return Ok(image);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                tracing::warn!(
                    attempt,
                    class = e.class(),
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retryable synthesis failure, backing off",
                );
                tokio::time::sleep(delay).await;
                delay = next_delay(delay, config);
            }
            Err(e) => return Err(e),
        }
    }

    unreachable!("retry loop returns on the final attempt")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
