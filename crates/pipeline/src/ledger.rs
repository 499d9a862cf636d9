//! The compensating-transaction choke point.
//!
//! Every credit movement the orchestrator makes goes through these two
//! functions, so each failure path after a debit is provably paired
//! with a refund and both movements publish their platform events from
//! one place.

use std::sync::Arc;

use thumbforge_core::types::DbId;
use thumbforge_db::models::credit::DebitOutcome;
use thumbforge_db::repositories::CreditLedgerRepo;
use thumbforge_db::DbPool;
use thumbforge_events::{EventBus, PlatformEvent};

/// Debit the generation cost up front. On success a
/// `credits.debited` event is published.
pub async fn debit_generation(
    pool: &DbPool,
    events: &Arc<EventBus>,
    user_id: DbId,
    generation_id: DbId,
    cost: i64,
) -> Result<DebitOutcome, sqlx::Error> {
    let outcome = CreditLedgerRepo::debit_for_generation(pool, user_id, generation_id, cost).await?;

    match outcome {
        DebitOutcome::Applied => {
            tracing::info!(user_id, generation_id, cost, "Credits debited");
            events.publish(
                PlatformEvent::new("credits.debited")
                    .with_source("generation", generation_id)
                    .with_actor(user_id)
                    .with_payload(serde_json::json!({ "amount": -cost })),
            );
        }
        DebitOutcome::InsufficientFunds => {
            tracing::info!(user_id, generation_id, cost, "Debit rejected: insufficient credits");
        }
    }
    Ok(outcome)
}

/// Issue the compensating refund for a failed generation.
///
/// Idempotent end to end: the repository inserts at most one refund
/// entry per generation, and the `credits.refunded` event is only
/// published when this call actually applied it.
pub async fn refund_generation(
    pool: &DbPool,
    events: &Arc<EventBus>,
    user_id: DbId,
    generation_id: DbId,
    cost: i64,
) -> Result<bool, sqlx::Error> {
    let refunded =
        CreditLedgerRepo::refund_for_generation(pool, user_id, generation_id, cost).await?;

    if refunded {
        tracing::info!(user_id, generation_id, cost, "Credits refunded");
        events.publish(
            PlatformEvent::new("credits.refunded")
                .with_source("generation", generation_id)
                .with_actor(user_id)
                .with_payload(serde_json::json!({ "amount": cost })),
        );
    } else {
        tracing::warn!(
            user_id,
            generation_id,
            "Refund skipped: already compensated",
        );
    }
    Ok(refunded)
}
