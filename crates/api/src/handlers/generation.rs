//! Handlers for the generation pipeline.
//!
//! Routes:
//! - `POST /generations`       — run the full pipeline for one request
//! - `GET  /generations/{id}`  — fetch a generation record

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use thumbforge_core::error::CoreError;
use thumbforge_core::generation::GenerationStatus;
use thumbforge_core::request::NewGeneration;
use thumbforge_core::types::{DbId, Timestamp};
use thumbforge_db::models::generation::Generation;
use thumbforge_db::repositories::GenerationRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /generations`.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub user_id: DbId,
    pub prompt: String,
    #[serde(default)]
    pub uploaded_image_refs: Vec<String>,
    pub preferred_style: Option<String>,
    pub preferred_mood: Option<String>,
    pub topic: Option<String>,
    /// Model slug; unknown values normalize silently to the default.
    pub model: Option<String>,
}

/// Caller-facing view of a generation record.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub id: DbId,
    pub status: &'static str,
    pub final_image_url: Option<String>,
    pub quality_score: Option<f64>,
    pub credits_used: i64,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl GenerateResponse {
    fn from_record(record: Generation) -> Result<Self, AppError> {
        let status = record.status().ok_or_else(|| {
            AppError::InternalError(format!(
                "Generation {} has unknown status id {}",
                record.id, record.status_id
            ))
        })?;
        let quality_score = record
            .quality
            .as_ref()
            .and_then(|q| q.get("overall_score"))
            .and_then(|v| v.as_f64());
        Ok(Self {
            id: record.id,
            status: status.as_str(),
            final_image_url: record.final_image_url,
            quality_score,
            credits_used: record.credits_charged,
            error_message: record.error_message,
            created_at: record.created_at,
            completed_at: record.completed_at,
        })
    }
}

/// POST /api/v1/generations
///
/// Validates the request, then drives the full pipeline to a terminal
/// record. Synchronous from the caller's perspective: the response
/// always carries `completed` or `failed`, never an in-progress state.
pub async fn generate(
    State(state): State<AppState>,
    Json(input): Json<GenerateRequest>,
) -> AppResult<impl IntoResponse> {
    let request = NewGeneration::accept(
        input.user_id,
        &input.prompt,
        input.uploaded_image_refs,
        input.preferred_style,
        input.preferred_mood,
        input.topic,
        input.model.as_deref(),
    )
    .map_err(AppError::Core)?;

    let record = state.pipeline.clone().run(request).await?;

    debug_assert!(matches!(
        record.status(),
        Some(GenerationStatus::Completed | GenerationStatus::Failed)
    ));

    Ok(Json(DataResponse {
        data: GenerateResponse::from_record(record)?,
    }))
}

/// GET /api/v1/generations/{id}
///
/// Terminal records are immutable, so reads are idempotent.
pub async fn get_generation(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = GenerationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Generation",
            id,
        }))?;

    Ok(Json(DataResponse {
        data: GenerateResponse::from_record(record)?,
    }))
}
