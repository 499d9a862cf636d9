//! Scripted mock implementations of the external service boundaries.
//!
//! Used by the retry and pipeline test suites, and handy for local
//! development without live services. Each mock counts its calls so
//! tests can assert exact interaction counts (e.g. "exactly one
//! synthesis per record").

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use thumbforge_core::metadata::UserMetadata;
use thumbforge_core::postprod::PostProductionPlan;
use thumbforge_core::quality::ImageMetrics;
use thumbforge_core::request::ImageModel;

use crate::analysis::PromptAnalyzer;
use crate::client::{ImageSynthesizer, SynthesizedImage};
use crate::error::{AnalysisError, RenderError, SynthesisError};
use crate::renderer::PostRenderer;

// ---------------------------------------------------------------------------
// Synthesizer
// ---------------------------------------------------------------------------

/// Mock synthesizer that replays a script of results, then falls back
/// to succeeding with a fixed URL.
pub struct MockSynthesizer {
    script: Mutex<VecDeque<Result<SynthesizedImage, SynthesisError>>>,
    fallback_url: String,
    calls: AtomicU32,
}

impl MockSynthesizer {
    /// Always succeed with `url`.
    pub fn succeeding(url: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback_url: url.into(),
            calls: AtomicU32::new(0),
        }
    }

    /// Replay `script` in order; once exhausted, succeed with a fixed
    /// fallback URL.
    pub fn scripted(script: Vec<Result<SynthesizedImage, SynthesisError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback_url: "https://img.example/fallback.png".into(),
            calls: AtomicU32::new(0),
        }
    }

    /// Number of synthesize calls received so far.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageSynthesizer for MockSynthesizer {
    async fn synthesize(
        &self,
        _prompt: &str,
        _model: ImageModel,
    ) -> Result<SynthesizedImage, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.script.lock().expect("mock script lock").pop_front();
        match scripted {
            Some(result) => result,
            None => Ok(SynthesizedImage {
                url: self.fallback_url.clone(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Mock analyzer returning fixed metadata, or failing when configured
/// unavailable.
pub struct MockAnalyzer {
    metadata: UserMetadata,
    unavailable: bool,
    calls: AtomicU32,
}

impl MockAnalyzer {
    pub fn returning(metadata: UserMetadata) -> Self {
        Self {
            metadata,
            unavailable: false,
            calls: AtomicU32::new(0),
        }
    }

    /// An analyzer whose service is down.
    pub fn unavailable() -> Self {
        Self {
            metadata: UserMetadata::default(),
            unavailable: true,
            calls: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PromptAnalyzer for MockAnalyzer {
    async fn analyze(
        &self,
        _prompt: &str,
        _image_refs: &[String],
    ) -> Result<UserMetadata, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(AnalysisError::Unavailable("mock outage".into()));
        }
        Ok(self.metadata.clone())
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Behavior of [`MockRenderer::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockRenderMode {
    /// Succeed, returning the input URL with a `-processed` suffix.
    Succeed,
    /// Reject the render (non-fatal for the pipeline).
    Reject,
    /// Simulate an unreachable renderer (fatal for the pipeline).
    Unreachable,
}

/// Mock renderer with configurable measured metrics and apply behavior.
pub struct MockRenderer {
    metrics: ImageMetrics,
    mode: MockRenderMode,
    apply_calls: AtomicU32,
}

impl MockRenderer {
    pub fn new(metrics: ImageMetrics, mode: MockRenderMode) -> Self {
        Self {
            metrics,
            mode,
            apply_calls: AtomicU32::new(0),
        }
    }

    /// A healthy renderer reporting the given metrics.
    pub fn healthy(metrics: ImageMetrics) -> Self {
        Self::new(metrics, MockRenderMode::Succeed)
    }

    pub fn apply_call_count(&self) -> u32 {
        self.apply_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostRenderer for MockRenderer {
    async fn measure(&self, _url: &str) -> Result<ImageMetrics, RenderError> {
        if self.mode == MockRenderMode::Unreachable {
            return Err(RenderError::Unreachable("mock outage".into()));
        }
        Ok(self.metrics)
    }

    async fn apply(&self, url: &str, _plan: &PostProductionPlan) -> Result<String, RenderError> {
        self.apply_calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            MockRenderMode::Succeed => Ok(format!("{url}?processed=1")),
            MockRenderMode::Reject => Err(RenderError::Rejected("mock rejection".into())),
            MockRenderMode::Unreachable => Err(RenderError::Unreachable("mock outage".into())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
