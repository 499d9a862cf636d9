use std::sync::Arc;

use thumbforge_pipeline::{CatalogCache, Pipeline};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: thumbforge_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The generation orchestrator.
    pub pipeline: Arc<Pipeline>,
    /// Read-through reference catalog cache.
    pub catalog: Arc<CatalogCache>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<thumbforge_events::EventBus>,
}
