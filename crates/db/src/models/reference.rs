//! Reference catalog models: curated thumbnails, their extracted
//! descriptors, and topic preference rows.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thumbforge_core::matcher::CatalogEntry;
use thumbforge_core::metadata::ThumbnailDescriptors;
use thumbforge_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A row from the `reference_thumbnails` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReferenceThumbnail {
    pub id: DbId,
    pub title: String,
    pub image_url: String,
    pub category: Option<String>,
    pub style: Option<String>,
    pub viral_score: f64,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `thumbnail_metadata` table (one-to-one with a
/// reference thumbnail).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ThumbnailMetadata {
    pub id: DbId,
    pub thumbnail_id: DbId,
    pub subject_position: Option<String>,
    pub text_position: Option<String>,
    pub text_alignment: Option<String>,
    pub color_palette: Vec<String>,
    pub lighting: Option<String>,
    pub contrast: Option<String>,
    pub mood: Option<String>,
    pub emotional_expression: Option<String>,
    pub has_text: bool,
    pub text_style: Option<String>,
    pub has_face: bool,
    pub face_expression: Option<String>,
    pub has_product: bool,
    pub layer_count: Option<i32>,
    pub symmetry: Option<String>,
    pub depth_of_field: Option<String>,
    pub extracted_prompt: Option<String>,
    pub confidence: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ThumbnailMetadata {
    /// Project the row into the matcher's descriptor type.
    pub fn descriptors(&self) -> ThumbnailDescriptors {
        ThumbnailDescriptors {
            subject_position: self.subject_position.clone(),
            text_position: self.text_position.clone(),
            text_alignment: self.text_alignment.clone(),
            color_palette: self.color_palette.clone(),
            lighting: self.lighting.clone(),
            contrast: self.contrast.clone(),
            mood: self.mood.clone(),
            emotional_expression: self.emotional_expression.clone(),
            has_text: self.has_text,
            text_style: self.text_style.clone(),
            has_face: self.has_face,
            face_expression: self.face_expression.clone(),
            has_product: self.has_product,
            layer_count: self.layer_count,
            symmetry: self.symmetry.clone(),
            depth_of_field: self.depth_of_field.clone(),
            extracted_prompt: self.extracted_prompt.clone(),
            confidence: self.confidence,
        }
    }
}

/// A row from the `topic_preferences` table: one curated candidate
/// reference for a topic, lower `rank` first.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TopicPreference {
    pub id: DbId,
    pub topic: String,
    pub thumbnail_id: DbId,
    pub rank: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTOs
// ---------------------------------------------------------------------------

/// Input for creating a reference thumbnail.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReferenceThumbnail {
    pub title: String,
    pub image_url: String,
    pub category: Option<String>,
    pub style: Option<String>,
    pub viral_score: f64,
    pub is_active: bool,
}

/// Input for attaching descriptors to a reference thumbnail.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateThumbnailMetadata {
    pub subject_position: Option<String>,
    pub text_position: Option<String>,
    pub text_alignment: Option<String>,
    pub color_palette: Vec<String>,
    pub lighting: Option<String>,
    pub contrast: Option<String>,
    pub mood: Option<String>,
    pub emotional_expression: Option<String>,
    pub has_text: bool,
    pub text_style: Option<String>,
    pub has_face: bool,
    pub face_expression: Option<String>,
    pub has_product: bool,
    pub layer_count: Option<i32>,
    pub symmetry: Option<String>,
    pub depth_of_field: Option<String>,
    pub extracted_prompt: Option<String>,
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// Joined row
// ---------------------------------------------------------------------------

/// One active reference joined with its descriptors, as loaded by the
/// catalog cache.
#[derive(Debug, Clone, FromRow)]
pub struct CatalogRow {
    pub id: DbId,
    pub title: String,
    pub category: Option<String>,
    pub style: Option<String>,
    pub viral_score: f64,
    pub subject_position: Option<String>,
    pub text_position: Option<String>,
    pub text_alignment: Option<String>,
    pub color_palette: Vec<String>,
    pub lighting: Option<String>,
    pub contrast: Option<String>,
    pub mood: Option<String>,
    pub emotional_expression: Option<String>,
    pub has_text: bool,
    pub text_style: Option<String>,
    pub has_face: bool,
    pub face_expression: Option<String>,
    pub has_product: bool,
    pub layer_count: Option<i32>,
    pub symmetry: Option<String>,
    pub depth_of_field: Option<String>,
    pub extracted_prompt: Option<String>,
    pub confidence: f64,
}

impl From<CatalogRow> for CatalogEntry {
    fn from(row: CatalogRow) -> Self {
        CatalogEntry {
            id: row.id,
            title: row.title,
            category: row.category,
            style: row.style,
            viral_score: row.viral_score,
            descriptors: ThumbnailDescriptors {
                subject_position: row.subject_position,
                text_position: row.text_position,
                text_alignment: row.text_alignment,
                color_palette: row.color_palette,
                lighting: row.lighting,
                contrast: row.contrast,
                mood: row.mood,
                emotional_expression: row.emotional_expression,
                has_text: row.has_text,
                text_style: row.text_style,
                has_face: row.has_face,
                face_expression: row.face_expression,
                has_product: row.has_product,
                layer_count: row.layer_count,
                symmetry: row.symmetry,
                depth_of_field: row.depth_of_field,
                extracted_prompt: row.extracted_prompt,
                confidence: row.confidence,
            },
        }
    }
}
