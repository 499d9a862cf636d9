//! Repository for the `topic_preferences` table.

use sqlx::PgPool;
use thumbforge_core::types::DbId;

use crate::models::reference::TopicPreference;

/// Column list for topic_preferences queries.
const COLUMNS: &str = "id, topic, thumbnail_id, rank, created_at, updated_at";

/// Curated per-topic candidate lists for the matcher.
pub struct TopicPreferenceRepo;

impl TopicPreferenceRepo {
    /// Upsert one preference row for a topic.
    pub async fn upsert(
        pool: &PgPool,
        topic: &str,
        thumbnail_id: DbId,
        rank: i32,
    ) -> Result<TopicPreference, sqlx::Error> {
        let query = format!(
            "INSERT INTO topic_preferences (topic, thumbnail_id, rank)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_topic_preferences_topic_thumbnail
             DO UPDATE SET rank = EXCLUDED.rank, updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TopicPreference>(&query)
            .bind(topic)
            .bind(thumbnail_id)
            .bind(rank)
            .fetch_one(pool)
            .await
    }

    /// Candidate thumbnail ids for a topic, best rank first.
    pub async fn candidate_ids(pool: &PgPool, topic: &str) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT thumbnail_id FROM topic_preferences
             WHERE topic = $1
             ORDER BY rank, thumbnail_id",
        )
        .bind(topic)
        .fetch_all(pool)
        .await
    }

    /// All preference rows, used by the catalog cache refresh.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<TopicPreference>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM topic_preferences ORDER BY topic, rank, thumbnail_id"
        );
        sqlx::query_as::<_, TopicPreference>(&query)
            .fetch_all(pool)
            .await
    }
}
