#![allow(dead_code)]

//! Shared seed helpers for db integration tests.

use sqlx::PgPool;
use thumbforge_core::credits::LedgerEntryType;
use thumbforge_core::types::DbId;
use thumbforge_db::models::generation::CreateGeneration;
use thumbforge_db::models::reference::{CreateReferenceThumbnail, CreateThumbnailMetadata};
use thumbforge_db::models::user::CreateUser;
use thumbforge_db::repositories::{CreditLedgerRepo, GenerationRepo, ReferenceRepo, UserRepo};

/// Create a user and grant them `credits` via a purchase entry.
pub async fn seed_user(pool: &PgPool, email: &str, credits: i64) -> DbId {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            display_name: "Test User".to_string(),
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

/// Create a pending generation record for a user.
pub async fn seed_generation(pool: &PgPool, user_id: DbId) -> DbId {
    GenerationRepo::create(
        pool,
        &CreateGeneration {
            user_id,
            user_prompt: "Create a gaming thumbnail with a shocked face".to_string(),
            uploaded_image_refs: vec![],
            preferred_style: None,
            preferred_mood: None,
            topic: Some("gaming".to_string()),
            model: "flux-dev".to_string(),
        },
    )
    .await
    .expect("create generation")
    .id
}

/// Create an active reference with descriptors attached.
pub async fn seed_reference(
    pool: &PgPool,
    title: &str,
    style: &str,
    viral_score: f64,
    mood: Option<&str>,
) -> DbId {
    let thumbnail = ReferenceRepo::create(
        pool,
        &CreateReferenceThumbnail {
            title: title.to_string(),
            image_url: format!("https://cdn.example/{title}.png"),
            category: Some("gaming".to_string()),
            style: Some(style.to_string()),
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
            mood: mood.map(str::to_string),
            emotional_expression: mood.map(str::to_string),
            lighting: Some("neon".to_string()),
            contrast: Some("high".to_string()),
            text_position: Some("top".to_string()),
            has_text: true,
            text_style: Some("bold uppercase".to_string()),
            has_face: true,
            color_palette: vec!["electric blue".to_string(), "magenta".to_string()],
            confidence: 0.9,
            ..Default::default()
        },
    )
    .await
    .expect("attach metadata");

    thumbnail.id
}
