#![allow(dead_code)]

//! Shared test-app builder for API integration tests.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::PgPool;
use thumbforge_api::config::ServerConfig;
use thumbforge_api::routes;
use thumbforge_api::state::AppState;
use thumbforge_core::credits::LedgerEntryType;
use thumbforge_core::quality::ImageMetrics;
use thumbforge_core::types::DbId;
use thumbforge_db::models::reference::{CreateReferenceThumbnail, CreateThumbnailMetadata};
use thumbforge_db::models::user::CreateUser;
use thumbforge_db::repositories::{CreditLedgerRepo, ReferenceRepo, UserRepo};
use thumbforge_events::EventBus;
use thumbforge_pipeline::{CatalogCache, Pipeline, PipelineConfig};
use thumbforge_synthesis::mock::{MockAnalyzer, MockRenderer, MockSynthesizer};
use thumbforge_synthesis::RetryConfig;

/// Build the full route tree over a mock-backed pipeline.
pub fn test_app(pool: &PgPool) -> Router {
    let config = test_config();
    let catalog = Arc::new(CatalogCache::new(pool.clone(), Duration::from_secs(60)));
    let event_bus = Arc::new(EventBus::default());

    let pipeline = Arc::new(Pipeline::new(
        pool.clone(),
        Arc::new(MockSynthesizer::succeeding("https://img.example/raw.png")),
        Arc::new(MockAnalyzer::unavailable()),
        Arc::new(MockRenderer::healthy(ImageMetrics {
            brightness: Some(80.0),
            contrast: Some(70.0),
            saturation: Some(75.0),
            sharpness: Some(85.0),
            composition: Some(65.0),
        })),
        Arc::clone(&catalog),
        Arc::clone(&event_bus),
        PipelineConfig {
            credit_cost: 2,
            retry: RetryConfig {
                max_attempts: 3,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(4),
                multiplier: 2.0,
            },
        },
    ));

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config),
        pipeline,
        catalog,
        event_bus,
    };

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .with_state(state)
}

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        cors_origins: vec![],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        synthesis_api_url: "http://localhost:8801".into(),
        vision_api_url: "http://localhost:8802".into(),
        render_api_url: "http://localhost:8803".into(),
        generation_credit_cost: 2,
        catalog_refresh: Duration::from_secs(60),
        synthesis_max_attempts: 3,
    }
}

/// Create a user with credits.
pub async fn seed_user(pool: &PgPool, email: &str, credits: i64) -> DbId {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            display_name: "API Tester".to_string(),
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

/// Create an active gaming reference with descriptors.
pub async fn seed_reference(pool: &PgPool) -> DbId {
    let thumbnail = ReferenceRepo::create(
        pool,
        &CreateReferenceThumbnail {
            title: "shocked-gamer".to_string(),
            image_url: "https://cdn.example/shocked-gamer.png".to_string(),
            category: Some("gaming".to_string()),
            style: Some("gaming".to_string()),
            viral_score: 0.9,
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
            mood: Some("shocked".to_string()),
            emotional_expression: Some("shocked".to_string()),
            lighting: Some("neon".to_string()),
            contrast: Some("high".to_string()),
            text_position: Some("top".to_string()),
            has_text: true,
            text_style: Some("bold uppercase".to_string()),
            has_face: true,
            color_palette: vec!["electric blue".to_string()],
            confidence: 0.9,
            ..Default::default()
        },
    )
    .await
    .expect("attach metadata");

    thumbnail.id
}
