//! Read-through cache over the reference catalog.
//!
//! The catalog is read-only during pipeline execution, so each process
//! holds a snapshot behind an `RwLock` and refreshes it when it is
//! older than the configured staleness bound. A snapshot is an `Arc`,
//! so in-flight requests keep matching against the catalog they
//! started with even while a refresh replaces it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thumbforge_core::matcher::CatalogEntry;
use thumbforge_core::types::DbId;
use thumbforge_db::repositories::{ReferenceRepo, TopicPreferenceRepo};
use thumbforge_db::DbPool;
use tokio::sync::RwLock;

/// Default staleness bound for the catalog snapshot.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// One immutable view of the matchable catalog.
pub struct CatalogSnapshot {
    /// Active references with descriptors, viral score descending.
    pub entries: Vec<CatalogEntry>,
    /// Precomputed candidate ids per (lowercased) topic, rank order.
    topics: HashMap<String, Vec<DbId>>,
    loaded_at: Instant,
}

impl CatalogSnapshot {
    /// Candidate reference ids for a topic, if the topic has a
    /// precomputed preference list.
    pub fn topic_candidates(&self, topic: &str) -> Option<&[DbId]> {
        self.topics
            .get(&topic.to_lowercase())
            .map(|ids| ids.as_slice())
    }

    /// Age of this snapshot.
    pub fn age(&self) -> Duration {
        self.loaded_at.elapsed()
    }
}

/// Process-wide catalog cache with a bounded refresh interval.
pub struct CatalogCache {
    pool: DbPool,
    refresh_interval: Duration,
    inner: RwLock<Option<Arc<CatalogSnapshot>>>,
}

impl CatalogCache {
    pub fn new(pool: DbPool, refresh_interval: Duration) -> Self {
        Self {
            pool,
            refresh_interval,
            inner: RwLock::new(None),
        }
    }

    /// Current snapshot, reloading from the database when the cached
    /// one is missing or older than the refresh interval.
    pub async fn snapshot(&self) -> Result<Arc<CatalogSnapshot>, sqlx::Error> {
        {
            let guard = self.inner.read().await;
            if let Some(snapshot) = guard.as_ref() {
                if snapshot.age() < self.refresh_interval {
                    return Ok(Arc::clone(snapshot));
                }
            }
        }
        self.refresh().await
    }

    /// Force a reload from the database.
    pub async fn refresh(&self) -> Result<Arc<CatalogSnapshot>, sqlx::Error> {
        let mut guard = self.inner.write().await;
        // Another writer may have refreshed while we waited for the lock.
        if let Some(snapshot) = guard.as_ref() {
            if snapshot.age() < self.refresh_interval {
                return Ok(Arc::clone(snapshot));
            }
        }

        let entries: Vec<CatalogEntry> = ReferenceRepo::load_catalog(&self.pool)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        let mut topics: HashMap<String, Vec<DbId>> = HashMap::new();
        for preference in TopicPreferenceRepo::list_all(&self.pool).await? {
            topics
                .entry(preference.topic.to_lowercase())
                .or_default()
                .push(preference.thumbnail_id);
        }

        tracing::debug!(
            entries = entries.len(),
            topics = topics.len(),
            "Reference catalog snapshot refreshed",
        );

        let snapshot = Arc::new(CatalogSnapshot {
            entries,
            topics,
            loaded_at: Instant::now(),
        });
        *guard = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }
}
