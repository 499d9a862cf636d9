//! The generation state machine.
//!
//! One [`Pipeline::run`] call drives a single request through every
//! stage in order. Stage boundaries are persisted as they happen, so a
//! record always reflects how far its request got. Failure semantics:
//!
//! - before the debit: the record is marked failed, nothing to refund;
//! - at or after the debit: the record is marked failed and exactly
//!   one compensating refund is issued through [`crate::ledger`].
//!
//! The pipeline body runs on a detached task, so a caller that
//! disconnects mid-run cannot strand a debited request: the task keeps
//! going until the record is terminal.

use std::sync::Arc;

use thumbforge_core::error::CoreError;
use thumbforge_core::generation::GenerationStatus;
use thumbforge_core::hashing::inputs_hash;
use thumbforge_core::matcher::select_best_match;
use thumbforge_core::metadata::{derive_metadata_hints, UserMetadata};
use thumbforge_core::postprod::plan_post_production;
use thumbforge_core::prompt::{
    compose, enhance_for_viral_potential, optimize_for_model, score_prompt_quality, PromptInputs,
};
use thumbforge_core::quality::assess;
use thumbforge_core::request::NewGeneration;
use thumbforge_core::types::DbId;
use thumbforge_db::models::credit::DebitOutcome;
use thumbforge_db::models::generation::{
    CompleteGeneration, CreateGeneration, Generation, RecordMatch, RecordPrompt,
};
use thumbforge_db::repositories::{GenerationRepo, UserRepo};
use thumbforge_db::DbPool;
use thumbforge_events::{EventBus, PlatformEvent};
use thumbforge_synthesis::{
    synthesize_with_retry, ImageSynthesizer, PostRenderer, PromptAnalyzer, RenderError,
    RetryConfig,
};

use crate::catalog::CatalogCache;
use crate::error::PipelineError;
use crate::ledger;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunables for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Fixed credits charged per generation.
    pub credit_cost: i64,
    /// Retry strategy for the synthesizer adapter (the only stage
    /// with internal retry).
    pub retry: RetryConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            credit_cost: thumbforge_core::credits::DEFAULT_GENERATION_COST,
            retry: RetryConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// The orchestrator. Cheap to clone via `Arc` in application state.
pub struct Pipeline {
    pool: DbPool,
    synthesizer: Arc<dyn ImageSynthesizer>,
    analyzer: Arc<dyn PromptAnalyzer>,
    renderer: Arc<dyn PostRenderer>,
    catalog: Arc<CatalogCache>,
    events: Arc<EventBus>,
    config: PipelineConfig,
}

/// How a stage failure terminates the run.
struct StageFailure {
    message: String,
}

impl StageFailure {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Pipeline {
    pub fn new(
        pool: DbPool,
        synthesizer: Arc<dyn ImageSynthesizer>,
        analyzer: Arc<dyn PromptAnalyzer>,
        renderer: Arc<dyn PostRenderer>,
        catalog: Arc<CatalogCache>,
        events: Arc<EventBus>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            pool,
            synthesizer,
            analyzer,
            renderer,
            catalog,
            events,
            config,
        }
    }

    /// Drive one accepted request to a terminal record.
    ///
    /// Takes `Arc<Self>` so the stage driver can be detached onto its
    /// own task. Returns the terminal row (`completed` or `failed`);
    /// an `Err` means the infrastructure failed before a terminal
    /// state could be persisted.
    pub async fn run(self: Arc<Self>, request: NewGeneration) -> Result<Generation, PipelineError> {
        // The user must exist before a record references them.
        UserRepo::find_by_id(&self.pool, request.user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "User",
                id: request.user_id,
            })?;

        let record = GenerationRepo::create(
            &self.pool,
            &CreateGeneration {
                user_id: request.user_id,
                user_prompt: request.user_prompt.clone(),
                uploaded_image_refs: request.uploaded_image_refs.clone(),
                preferred_style: request.preferred_style.clone(),
                preferred_mood: request.preferred_mood.clone(),
                topic: request.topic.clone(),
                model: request.model.as_str().to_string(),
            },
        )
        .await?;
        let generation_id = record.id;

        self.events.publish(
            PlatformEvent::new("generation.started")
                .with_source("generation", generation_id)
                .with_actor(request.user_id),
        );
        tracing::info!(generation_id, user_id = request.user_id, "Generation started");

        // Detach the stage driver so caller disconnects cannot abort a
        // run that may already have debited credits.
        let pipeline = Arc::clone(&self);
        let handle = tokio::spawn(async move {
            pipeline.execute(generation_id, request).await
        });
        let outcome = handle
            .await
            .map_err(|e| CoreError::Internal(format!("Pipeline task panicked: {e}")))?;

        match outcome {
            Ok(()) => {}
            Err(StageOutcome::Failed { debited, failure }) => {
                self.settle_failure(generation_id, debited, &failure).await?;
            }
            Err(StageOutcome::Infrastructure { debited, error }) => {
                // Best effort: even an infrastructure error must not
                // leave credits in limbo.
                let failure = StageFailure::new(format!("Internal error: {error}"));
                self.settle_failure(generation_id, debited, &failure).await?;
                return Err(error);
            }
        }

        let record = GenerationRepo::find_by_id(&self.pool, generation_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Generation",
                id: generation_id,
            })?;
        Ok(record)
    }

    /// Mark the record failed and, when the debit already happened,
    /// issue the compensating refund. The user and cost are read back
    /// from the record to keep this path self-contained.
    async fn settle_failure(
        &self,
        generation_id: DbId,
        debited: bool,
        failure: &StageFailure,
    ) -> Result<(), PipelineError> {
        if debited {
            // Refund first: if the process dies between these two
            // writes, the record is still non-terminal and a retry of
            // the refund is a no-op.
            if let Some(record) = GenerationRepo::find_by_id(&self.pool, generation_id).await? {
                ledger::refund_generation(
                    &self.pool,
                    &self.events,
                    record.user_id,
                    generation_id,
                    self.config.credit_cost,
                )
                .await?;
            }
        }

        // Net charge is zero either way: nothing was taken, or the
        // refund above restored it.
        GenerationRepo::fail(&self.pool, generation_id, &failure.message, 0).await?;

        tracing::warn!(generation_id, error = %failure.message, "Generation failed");
        self.events.publish(
            PlatformEvent::new("generation.failed")
                .with_source("generation", generation_id)
                .with_payload(serde_json::json!({ "error": failure.message })),
        );
        Ok(())
    }

    /// Advance the record, surfacing the terminal-guard as an error:
    /// a live pipeline must never find its own record terminal.
    async fn advance(
        &self,
        generation_id: DbId,
        status: GenerationStatus,
    ) -> Result<(), StageOutcome> {
        let updated = GenerationRepo::set_status(&self.pool, generation_id, status)
            .await
            .map_err(|e| StageOutcome::infra(false, e.into()))?;
        if !updated {
            return Err(StageOutcome::infra(
                false,
                CoreError::Conflict(format!(
                    "Generation {generation_id} was finalized by another writer"
                ))
                .into(),
            ));
        }
        Ok(())
    }

    /// Run every stage for one record. Persisted state advances with
    /// the stages; the returned error says whether a refund is owed.
    async fn execute(&self, generation_id: DbId, request: NewGeneration) -> Result<(), StageOutcome> {
        // -- validating ----------------------------------------------------
        self.advance(generation_id, GenerationStatus::Validating).await?;
        thumbforge_core::credits::validate_cost(self.config.credit_cost)
            .map_err(|e| StageOutcome::failed(false, e.to_string()))?;

        // -- analyzing -----------------------------------------------------
        self.advance(generation_id, GenerationStatus::Analyzing).await?;
        let analyzed = match self
            .analyzer
            .analyze(&request.user_prompt, &request.uploaded_image_refs)
            .await
        {
            Ok(metadata) => metadata,
            Err(e) => {
                // Best-effort boundary: keyword hints carry the stage.
                tracing::warn!(generation_id, error = %e, "Analysis unavailable, using prompt hints");
                UserMetadata::default()
            }
        };
        let hints = derive_metadata_hints(&request.user_prompt);
        let mut metadata = analyzed.merge_missing(&hints);
        if let Some(mood) = &request.preferred_mood {
            metadata.mood = Some(mood.clone());
        }

        // -- matching ------------------------------------------------------
        self.advance(generation_id, GenerationStatus::Matching).await?;
        let snapshot = self
            .catalog
            .snapshot()
            .await
            .map_err(|e| StageOutcome::infra(false, e.into()))?;
        let topic_candidates = request
            .topic
            .as_deref()
            .and_then(|topic| snapshot.topic_candidates(topic));
        let matched = select_best_match(
            &metadata,
            &snapshot.entries,
            topic_candidates,
            request.preferred_style.as_deref(),
        );

        let match_record = RecordMatch {
            reference_id: matched.map(|(entry, _)| entry.id),
            match_score: matched.map(|(_, result)| result.match_score),
            user_metadata: serde_json::to_value(&metadata)
                .unwrap_or(serde_json::Value::Null),
        };
        GenerationRepo::record_match(&self.pool, generation_id, &match_record)
            .await
            .map_err(|e| StageOutcome::infra(false, e.into()))?;

        if let Some((entry, result)) = matched {
            tracing::debug!(
                generation_id,
                reference_id = entry.id,
                match_score = result.match_score,
                "Reference matched",
            );
        } else {
            tracing::debug!(generation_id, "No matchable reference, using default templates");
        }

        // -- prompting -----------------------------------------------------
        self.advance(generation_id, GenerationStatus::Prompting).await?;
        let inputs = PromptInputs {
            user_prompt: &request.user_prompt,
            user: &metadata,
            reference: matched.map(|(entry, _)| &entry.descriptors),
            preferred_style: request.preferred_style.as_deref(),
            preferred_mood: request.preferred_mood.as_deref(),
        };
        let composed = compose(&inputs);
        let enhanced = enhance_for_viral_potential(&composed, request.topic.as_deref());
        let final_prompt = optimize_for_model(&enhanced, request.model);
        let report = score_prompt_quality(&final_prompt);

        let prompt_record = RecordPrompt {
            inputs_hash: inputs_hash(
                &request.user_prompt,
                request.model.as_str(),
                matched.map(|(entry, _)| entry.id),
                &final_prompt,
            ),
            prompt_report: serde_json::to_value(&report).unwrap_or(serde_json::Value::Null),
            final_prompt: final_prompt.clone(),
        };
        GenerationRepo::record_prompt(&self.pool, generation_id, &prompt_record)
            .await
            .map_err(|e| StageOutcome::infra(false, e.into()))?;

        // -- debit ---------------------------------------------------------
        // The point of no free return: from here on, every failure
        // must refund.
        let outcome = ledger::debit_generation(
            &self.pool,
            &self.events,
            request.user_id,
            generation_id,
            self.config.credit_cost,
        )
        .await
        .map_err(|e| StageOutcome::infra(false, e.into()))?;

        if outcome == DebitOutcome::InsufficientFunds {
            let error = CoreError::InsufficientCredits {
                required: self.config.credit_cost,
            };
            return Err(StageOutcome::failed(false, error.to_string()));
        }

        // -- generating ----------------------------------------------------
        self.advance_post_debit(generation_id, GenerationStatus::Generating).await?;
        let image = synthesize_with_retry(
            self.synthesizer.as_ref(),
            &final_prompt,
            request.model,
            &self.config.retry,
        )
        .await
        .map_err(|e| StageOutcome::failed(true, format!("Image synthesis failed: {e}")))?;

        GenerationRepo::record_image(&self.pool, generation_id, &image.url)
            .await
            .map_err(|e| StageOutcome::infra(true, e.into()))?;

        // -- post_processing -----------------------------------------------
        self.advance_post_debit(generation_id, GenerationStatus::PostProcessing).await?;
        let metrics = match self.renderer.measure(&image.url).await {
            Ok(metrics) => metrics,
            Err(RenderError::Unreachable(reason)) => {
                return Err(StageOutcome::failed(
                    true,
                    format!("Post-production renderer unreachable: {reason}"),
                ));
            }
            Err(RenderError::Rejected(reason)) => {
                tracing::warn!(generation_id, %reason, "Metric measurement rejected");
                Default::default()
            }
        };

        let assessment = assess(&metrics);
        let plan = plan_post_production(&assessment);

        let final_url = match self.renderer.apply(&image.url, &plan).await {
            Ok(processed_url) => processed_url,
            Err(RenderError::Rejected(reason)) => {
                // Non-fatal: deliver the unprocessed image.
                tracing::warn!(generation_id, %reason, "Render rejected, delivering unprocessed image");
                image.url.clone()
            }
            Err(RenderError::Unreachable(reason)) => {
                return Err(StageOutcome::failed(
                    true,
                    format!("Post-production renderer unreachable: {reason}"),
                ));
            }
        };

        // -- delivery ------------------------------------------------------
        let applied_effects = plan.applied_effects();
        let completion = CompleteGeneration {
            final_image_url: final_url,
            quality: serde_json::to_value(&assessment).unwrap_or(serde_json::Value::Null),
            post_production: serde_json::json!({
                "plan": plan,
                "applied_effects": applied_effects,
            }),
            credits_charged: self.config.credit_cost,
        };
        GenerationRepo::complete(&self.pool, generation_id, &completion)
            .await
            .map_err(|e| StageOutcome::infra(true, e.into()))?;

        tracing::info!(
            generation_id,
            overall_score = assessment.overall_score,
            "Generation completed",
        );
        self.events.publish(
            PlatformEvent::new("generation.completed")
                .with_source("generation", generation_id)
                .with_actor(request.user_id)
                .with_payload(serde_json::json!({
                    "quality_score": assessment.overall_score,
                })),
        );
        Ok(())
    }

    /// [`advance`](Self::advance) for stages past the debit point,
    /// tagging infrastructure errors as refund-owing.
    async fn advance_post_debit(
        &self,
        generation_id: DbId,
        status: GenerationStatus,
    ) -> Result<(), StageOutcome> {
        self.advance(generation_id, status).await.map_err(|outcome| {
            match outcome {
                StageOutcome::Infrastructure { error, .. } => StageOutcome::infra(true, error),
                failed @ StageOutcome::Failed { .. } => failed,
            }
        })
    }
}

/// Why `execute` stopped early, and whether credits were already taken.
enum StageOutcome {
    /// A typed stage failure: the record should be marked failed.
    Failed { debited: bool, failure: StageFailure },
    /// The infrastructure itself broke mid-run.
    Infrastructure { debited: bool, error: PipelineError },
}

impl StageOutcome {
    fn failed(debited: bool, message: impl Into<String>) -> Self {
        Self::Failed {
            debited,
            failure: StageFailure::new(message),
        }
    }

    fn infra(debited: bool, error: PipelineError) -> Self {
        Self::Infrastructure { debited, error }
    }
}
