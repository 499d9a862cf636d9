//! Repository for the reference catalog tables.

use sqlx::PgPool;
use thumbforge_core::types::DbId;

use crate::models::reference::{
    CatalogRow, CreateReferenceThumbnail, CreateThumbnailMetadata, ReferenceThumbnail,
    ThumbnailMetadata,
};

/// Column list for reference_thumbnails queries.
const THUMBNAIL_COLUMNS: &str =
    "id, title, image_url, category, style, viral_score, is_active, created_at, updated_at";

/// Column list for thumbnail_metadata queries.
const METADATA_COLUMNS: &str = "id, thumbnail_id, subject_position, text_position, \
    text_alignment, color_palette, lighting, contrast, mood, emotional_expression, \
    has_text, text_style, has_face, face_expression, has_product, layer_count, \
    symmetry, depth_of_field, extracted_prompt, confidence, created_at, updated_at";

/// Joined columns used when loading the matchable catalog.
const CATALOG_COLUMNS: &str = "t.id, t.title, t.category, t.style, t.viral_score, \
    m.subject_position, m.text_position, m.text_alignment, m.color_palette, \
    m.lighting, m.contrast, m.mood, m.emotional_expression, m.has_text, m.text_style, \
    m.has_face, m.face_expression, m.has_product, m.layer_count, m.symmetry, \
    m.depth_of_field, m.extracted_prompt, m.confidence";

/// Read-mostly catalog access plus the write paths used by curation
/// and test seeding.
pub struct ReferenceRepo;

impl ReferenceRepo {
    /// Insert a reference thumbnail, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateReferenceThumbnail,
    ) -> Result<ReferenceThumbnail, sqlx::Error> {
        let query = format!(
            "INSERT INTO reference_thumbnails
                (title, image_url, category, style, viral_score, is_active)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {THUMBNAIL_COLUMNS}"
        );
        sqlx::query_as::<_, ReferenceThumbnail>(&query)
            .bind(&input.title)
            .bind(&input.image_url)
            .bind(&input.category)
            .bind(&input.style)
            .bind(input.viral_score)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Attach extracted descriptors to a thumbnail (one-to-one).
    pub async fn attach_metadata(
        pool: &PgPool,
        thumbnail_id: DbId,
        input: &CreateThumbnailMetadata,
    ) -> Result<ThumbnailMetadata, sqlx::Error> {
        let query = format!(
            "INSERT INTO thumbnail_metadata
                (thumbnail_id, subject_position, text_position, text_alignment,
                 color_palette, lighting, contrast, mood, emotional_expression,
                 has_text, text_style, has_face, face_expression, has_product,
                 layer_count, symmetry, depth_of_field, extracted_prompt, confidence)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                     $11, $12, $13, $14, $15, $16, $17, $18, $19)
             RETURNING {METADATA_COLUMNS}"
        );
        sqlx::query_as::<_, ThumbnailMetadata>(&query)
            .bind(thumbnail_id)
            .bind(&input.subject_position)
            .bind(&input.text_position)
            .bind(&input.text_alignment)
            .bind(&input.color_palette)
            .bind(&input.lighting)
            .bind(&input.contrast)
            .bind(&input.mood)
            .bind(&input.emotional_expression)
            .bind(input.has_text)
            .bind(&input.text_style)
            .bind(input.has_face)
            .bind(&input.face_expression)
            .bind(input.has_product)
            .bind(input.layer_count)
            .bind(&input.symmetry)
            .bind(&input.depth_of_field)
            .bind(&input.extracted_prompt)
            .bind(input.confidence)
            .fetch_one(pool)
            .await
    }

    /// Find a thumbnail by primary key.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ReferenceThumbnail>, sqlx::Error> {
        let query = format!("SELECT {THUMBNAIL_COLUMNS} FROM reference_thumbnails WHERE id = $1");
        sqlx::query_as::<_, ReferenceThumbnail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Descriptors for a thumbnail, if extracted.
    pub async fn get_metadata(
        pool: &PgPool,
        thumbnail_id: DbId,
    ) -> Result<Option<ThumbnailMetadata>, sqlx::Error> {
        let query =
            format!("SELECT {METADATA_COLUMNS} FROM thumbnail_metadata WHERE thumbnail_id = $1");
        sqlx::query_as::<_, ThumbnailMetadata>(&query)
            .bind(thumbnail_id)
            .fetch_optional(pool)
            .await
    }

    /// List active thumbnails, optionally filtered by style and/or
    /// category, ordered by viral score descending.
    pub async fn list_active(
        pool: &PgPool,
        style: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<ReferenceThumbnail>, sqlx::Error> {
        let query = format!(
            "SELECT {THUMBNAIL_COLUMNS} FROM reference_thumbnails
             WHERE is_active = TRUE
               AND ($1::TEXT IS NULL OR style = $1)
               AND ($2::TEXT IS NULL OR category = $2)
             ORDER BY viral_score DESC, id"
        );
        sqlx::query_as::<_, ReferenceThumbnail>(&query)
            .bind(style)
            .bind(category)
            .fetch_all(pool)
            .await
    }

    /// Load every active reference with its descriptors, ordered by
    /// viral score descending. This is the catalog cache's refresh
    /// query; references without extracted metadata are not matchable
    /// and are excluded.
    pub async fn load_catalog(pool: &PgPool) -> Result<Vec<CatalogRow>, sqlx::Error> {
        let query = format!(
            "SELECT {CATALOG_COLUMNS}
             FROM reference_thumbnails t
             JOIN thumbnail_metadata m ON m.thumbnail_id = t.id
             WHERE t.is_active = TRUE
             ORDER BY t.viral_score DESC, t.id"
        );
        sqlx::query_as::<_, CatalogRow>(&query).fetch_all(pool).await
    }

    /// Deactivate a thumbnail, removing it from matching.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE reference_thumbnails
             SET is_active = FALSE, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
