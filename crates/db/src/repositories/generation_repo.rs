//! Repository for the `generations` table.
//!
//! Every UPDATE carries `status_id NOT IN (completed, failed)` so a
//! terminal record can never be mutated, no matter who races whom.

use sqlx::PgPool;
use thumbforge_core::generation::GenerationStatus;
use thumbforge_core::types::DbId;

use crate::models::generation::{
    CompleteGeneration, CreateGeneration, Generation, RecordMatch, RecordPrompt,
};

/// Column list for generations queries.
const COLUMNS: &str = "id, user_id, user_prompt, uploaded_image_refs, preferred_style, \
    preferred_mood, topic, model, status_id, reference_id, match_score, user_metadata, \
    final_prompt, prompt_report, final_image_url, quality, post_production, \
    credits_charged, error_message, inputs_hash, completed_at, created_at, updated_at";

/// Guard clause shared by every update: terminal records are immutable.
const NOT_TERMINAL: &str = "status_id NOT IN (8, 9)";

/// Provides CRUD operations for generation records.
pub struct GenerationRepo;

impl GenerationRepo {
    /// Insert a new pending record, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateGeneration,
    ) -> Result<Generation, sqlx::Error> {
        let query = format!(
            "INSERT INTO generations
                (user_id, user_prompt, uploaded_image_refs, preferred_style,
                 preferred_mood, topic, model)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Generation>(&query)
            .bind(input.user_id)
            .bind(&input.user_prompt)
            .bind(&input.uploaded_image_refs)
            .bind(&input.preferred_style)
            .bind(&input.preferred_mood)
            .bind(&input.topic)
            .bind(&input.model)
            .fetch_one(pool)
            .await
    }

    /// Find a record by primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Generation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generations WHERE id = $1");
        sqlx::query_as::<_, Generation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's records, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<Generation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generations
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, Generation>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Advance a record to `status`. Returns `true` if a non-terminal
    /// row was updated.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: GenerationStatus,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE generations
             SET status_id = $1, updated_at = NOW()
             WHERE id = $2 AND {NOT_TERMINAL}"
        );
        let result = sqlx::query(&query)
            .bind(status.id())
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Write the matching-stage snapshot.
    pub async fn record_match(
        pool: &PgPool,
        id: DbId,
        input: &RecordMatch,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE generations
             SET reference_id = $1, match_score = $2, user_metadata = $3,
                 updated_at = NOW()
             WHERE id = $4 AND {NOT_TERMINAL}"
        );
        let result = sqlx::query(&query)
            .bind(input.reference_id)
            .bind(input.match_score)
            .bind(&input.user_metadata)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Write the prompting-stage snapshot.
    pub async fn record_prompt(
        pool: &PgPool,
        id: DbId,
        input: &RecordPrompt,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE generations
             SET final_prompt = $1, prompt_report = $2, inputs_hash = $3,
                 updated_at = NOW()
             WHERE id = $4 AND {NOT_TERMINAL}"
        );
        let result = sqlx::query(&query)
            .bind(&input.final_prompt)
            .bind(&input.prompt_report)
            .bind(&input.inputs_hash)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the synthesized image URL as soon as it exists, so a
    /// crash between synthesis and completion still leaves provenance.
    pub async fn record_image(
        pool: &PgPool,
        id: DbId,
        final_image_url: &str,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE generations
             SET final_image_url = $1, updated_at = NOW()
             WHERE id = $2 AND {NOT_TERMINAL}"
        );
        let result = sqlx::query(&query)
            .bind(final_image_url)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Finalize a record as completed. Returns `true` if a
    /// non-terminal row was updated.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        input: &CompleteGeneration,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE generations
             SET status_id = $1, final_image_url = $2, quality = $3,
                 post_production = $4, credits_charged = $5,
                 completed_at = NOW(), updated_at = NOW()
             WHERE id = $6 AND {NOT_TERMINAL}"
        );
        let result = sqlx::query(&query)
            .bind(GenerationStatus::Completed.id())
            .bind(&input.final_image_url)
            .bind(&input.quality)
            .bind(&input.post_production)
            .bind(input.credits_charged)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Finalize a record as failed with a human-readable reason.
    pub async fn fail(
        pool: &PgPool,
        id: DbId,
        error_message: &str,
        credits_charged: i64,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE generations
             SET status_id = $1, error_message = $2, credits_charged = $3,
                 completed_at = NOW(), updated_at = NOW()
             WHERE id = $4 AND {NOT_TERMINAL}"
        );
        let result = sqlx::query(&query)
            .bind(GenerationStatus::Failed.id())
            .bind(error_message)
            .bind(credits_charged)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
