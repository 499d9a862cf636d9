//! Generation record models and stage DTOs.
//!
//! The row mirrors the pipeline: each stage fills in its columns as
//! the record advances, and the match/prompt/quality state is
//! snapshotted into JSONB so history never changes when the catalog
//! does.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thumbforge_core::generation::GenerationStatus;
use thumbforge_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `generations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Generation {
    pub id: DbId,
    pub user_id: DbId,
    pub user_prompt: String,
    pub uploaded_image_refs: Vec<String>,
    pub preferred_style: Option<String>,
    pub preferred_mood: Option<String>,
    pub topic: Option<String>,
    pub model: String,
    pub status_id: i16,
    pub reference_id: Option<DbId>,
    pub match_score: Option<f64>,
    pub user_metadata: Option<serde_json::Value>,
    pub final_prompt: Option<String>,
    pub prompt_report: Option<serde_json::Value>,
    pub final_image_url: Option<String>,
    pub quality: Option<serde_json::Value>,
    pub post_production: Option<serde_json::Value>,
    pub credits_charged: i64,
    pub error_message: Option<String>,
    pub inputs_hash: Option<String>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Generation {
    /// Decode the status column, tolerating nothing: an unknown id is
    /// a corrupted row.
    pub fn status(&self) -> Option<GenerationStatus> {
        GenerationStatus::from_id(self.status_id)
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for inserting a new generation record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGeneration {
    pub user_id: DbId,
    pub user_prompt: String,
    pub uploaded_image_refs: Vec<String>,
    pub preferred_style: Option<String>,
    pub preferred_mood: Option<String>,
    pub topic: Option<String>,
    pub model: String,
}

// ---------------------------------------------------------------------------
// Stage DTOs
// ---------------------------------------------------------------------------

/// Snapshot written by the matching stage.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordMatch {
    pub reference_id: Option<DbId>,
    pub match_score: Option<f64>,
    pub user_metadata: serde_json::Value,
}

/// Snapshot written by the prompting stage.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordPrompt {
    pub final_prompt: String,
    pub prompt_report: serde_json::Value,
    pub inputs_hash: String,
}

/// Final state written when the pipeline completes.
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteGeneration {
    pub final_image_url: String,
    pub quality: serde_json::Value,
    pub post_production: serde_json::Value,
    pub credits_charged: i64,
}
