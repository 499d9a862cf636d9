#![allow(dead_code)]

//! Shared builders for pipeline integration tests.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use thumbforge_core::credits::LedgerEntryType;
use thumbforge_core::quality::ImageMetrics;
use thumbforge_core::request::NewGeneration;
use thumbforge_core::types::DbId;
use thumbforge_db::models::reference::{CreateReferenceThumbnail, CreateThumbnailMetadata};
use thumbforge_db::models::user::CreateUser;
use thumbforge_db::repositories::{CreditLedgerRepo, ReferenceRepo, UserRepo};
use thumbforge_events::EventBus;
use thumbforge_pipeline::{CatalogCache, Pipeline, PipelineConfig};
use thumbforge_synthesis::mock::{MockAnalyzer, MockRenderer, MockSynthesizer};
use thumbforge_synthesis::{ImageSynthesizer, PostRenderer, PromptAnalyzer, RetryConfig};

/// Metrics a healthy mock renderer reports: mean 75, no issues.
pub fn healthy_metrics() -> ImageMetrics {
    ImageMetrics {
        brightness: Some(80.0),
        contrast: Some(70.0),
        saturation: Some(75.0),
        sharpness: Some(85.0),
        composition: Some(65.0),
    }
}

/// Retry config with millisecond backoff so tests stay fast.
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(4),
        multiplier: 2.0,
    }
}

/// Assemble a pipeline over mocks. The analyzer is configured
/// unavailable so the prompt-derived keyword hints carry analysis.
pub fn build_pipeline(
    pool: &PgPool,
    synthesizer: Arc<dyn ImageSynthesizer>,
    renderer: Arc<dyn PostRenderer>,
) -> Arc<Pipeline> {
    build_pipeline_with_analyzer(pool, synthesizer, Arc::new(MockAnalyzer::unavailable()), renderer)
}

pub fn build_pipeline_with_analyzer(
    pool: &PgPool,
    synthesizer: Arc<dyn ImageSynthesizer>,
    analyzer: Arc<dyn PromptAnalyzer>,
    renderer: Arc<dyn PostRenderer>,
) -> Arc<Pipeline> {
    let catalog = Arc::new(CatalogCache::new(pool.clone(), Duration::from_secs(60)));
    let events = Arc::new(EventBus::default());
    Arc::new(Pipeline::new(
        pool.clone(),
        synthesizer,
        analyzer,
        renderer,
        catalog,
        events,
        PipelineConfig {
            credit_cost: 2,
            retry: fast_retry(),
        },
    ))
}

/// A pipeline whose synthesizer and renderer both behave.
pub fn happy_pipeline(pool: &PgPool) -> Arc<Pipeline> {
    build_pipeline(
        pool,
        Arc::new(MockSynthesizer::succeeding("https://img.example/raw.png")),
        Arc::new(MockRenderer::healthy(healthy_metrics())),
    )
}

/// Create a user and grant them `credits`.
pub async fn seed_user(pool: &PgPool, email: &str, credits: i64) -> DbId {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            display_name: "Pipeline Tester".to_string(),
        },
    )
    .await
    .expect("create user");

    if credits > 0 {
        CreditLedgerRepo::grant(pool, user.id, credits, LedgerEntryType::Purchase, "Seed credits")
            .await
            .expect("grant credits");
    }
    user.id
}

/// Create an active gaming reference with full descriptors.
pub async fn seed_gaming_reference(
    pool: &PgPool,
    title: &str,
    viral_score: f64,
    mood: &str,
) -> DbId {
    let thumbnail = ReferenceRepo::create(
        pool,
        &CreateReferenceThumbnail {
            title: title.to_string(),
            image_url: format!("https://cdn.example/{title}.png"),
            category: Some("gaming".to_string()),
            style: Some("gaming".to_string()),
            viral_score,
            is_active: true,
        },
    )
    .await
    .expect("create reference");

    ReferenceRepo::attach_metadata(
        pool,
        thumbnail.id,
        &CreateThumbnailMetadata {
            subject_position: Some("center".to_string()),
            text_position: Some("top".to_string()),
            color_palette: vec!["electric blue".to_string(), "magenta".to_string()],
            lighting: Some("neon".to_string()),
            contrast: Some("high".to_string()),
            mood: Some(mood.to_string()),
            emotional_expression: Some(mood.to_string()),
            has_text: true,
            text_style: Some("bold uppercase".to_string()),
            has_face: true,
            face_expression: Some(mood.to_string()),
            confidence: 0.9,
            ..Default::default()
        },
    )
    .await
    .expect("attach metadata");

    thumbnail.id
}

/// The canonical request used across the pipeline tests.
pub fn gaming_request(user_id: DbId) -> NewGeneration {
    NewGeneration::accept(
        user_id,
        "Create a gaming thumbnail with a shocked face",
        vec![],
        None,
        None,
        Some("gaming".to_string()),
        None,
    )
    .expect("valid request")
}
