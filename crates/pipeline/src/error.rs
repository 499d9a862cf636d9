//! Pipeline-level error type.

use thumbforge_core::error::CoreError;

/// Errors surfaced by [`Pipeline::run`](crate::Pipeline::run).
///
/// Stage failures that terminate a record (synthesis rejection,
/// unreachable renderer, insufficient credits) are not errors at this
/// level — they produce a `failed` record the caller can read. This
/// type covers what prevents the pipeline from reaching a terminal
/// record at all.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A domain-level rejection before any record exists.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The persistence layer failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
