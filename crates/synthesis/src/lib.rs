//! Adapters to the three external collaborators of the generation
//! pipeline: the image-generation service, the vision/LLM analysis
//! service, and the post-production renderer.
//!
//! Each boundary is a trait so the orchestrator and its tests can run
//! against scripted mocks; the `*Api` types are the reqwest-backed
//! production implementations.

pub mod analysis;
pub mod client;
pub mod error;
pub mod mock;
pub mod renderer;
pub mod retry;

pub use analysis::{PromptAnalyzer, VisionApi};
pub use client::{ImageSynthesizer, SynthesisApi, SynthesizedImage};
pub use error::{AnalysisError, RenderError, SynthesisError};
pub use renderer::{PostRenderer, RenderApi, RenderedImage};
pub use retry::{next_delay, synthesize_with_retry, RetryConfig};
