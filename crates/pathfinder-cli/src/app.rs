//! Wiring config to store, editor and pipeline

use anyhow::Context;
use pathfinder_core::{
    EnrichmentError, EnrichmentPipeline, EnrichmentStep, PathfinderConfig, ProfileEditor,
    StoreBackend,
};
use pathfinder_llm::ChatCompletionsGenerator;
use pathfinder_profile::UserId;
use pathfinder_store::{AggregateStore, InMemoryStore, JsonFileStore};
use std::sync::Arc;

pub(crate) struct App {
    pub(crate) config: PathfinderConfig,
    pub(crate) store: Arc<dyn AggregateStore>,
}

impl App {
    pub(crate) async fn open(config: PathfinderConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn AggregateStore> = match config.store.backend {
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory store; nothing outlives this process");
                Arc::new(InMemoryStore::new())
            }
            StoreBackend::File => {
                let store = JsonFileStore::open(&config.store.path)
                    .await
                    .with_context(|| {
                        format!("failed to open store at {}", config.store.path.display())
                    })?;
                Arc::new(store)
            }
        };
        Ok(Self { config, store })
    }

    pub(crate) fn editor(&self) -> ProfileEditor {
        ProfileEditor::new(self.store.clone(), self.config.pipeline.max_merge_attempts)
    }

    pub(crate) fn pipeline(&self) -> anyhow::Result<EnrichmentPipeline> {
        let generator = ChatCompletionsGenerator::new(self.config.llm.clone())
            .context("failed to set up the generative service")?;
        Ok(EnrichmentPipeline::new(
            self.store.clone(),
            Arc::new(generator),
            self.config.pipeline.clone(),
        ))
    }
}

/// Run a step; a failed save is retried once before giving up
///
/// Returns `None` when the artifact was only saved on the retry.
pub(crate) async fn run_step<S: EnrichmentStep>(
    pipeline: &EnrichmentPipeline,
    step: &S,
    user: &UserId,
    input: S::Input,
) -> anyhow::Result<Option<S::Artifact>> {
    let err = match pipeline.run_for_user(step, user, input).await {
        Ok(outcome) => {
            tracing::debug!("{} committed at {}", step.kind(), outcome.receipt.revision);
            return Ok(Some(outcome.artifact));
        }
        Err(err) => err,
    };

    let hint = hint(&err);
    let message = err.to_string();
    match err.into_pending() {
        Some(pending) => {
            tracing::warn!("{}; retrying the save", message);
            let receipt = pipeline
                .retry_persist(pending)
                .await
                .with_context(|| format!("{message}. {hint}"))?;
            tracing::info!("Saved on retry at {}", receipt.revision);
            Ok(None)
        }
        None => anyhow::bail!("{message}. {hint}"),
    }
}

fn hint(err: &EnrichmentError) -> &'static str {
    use pathfinder_core::ErrorKind;
    match err.kind() {
        ErrorKind::PreconditionFailed => "Fill in the missing fields first",
        ErrorKind::ValidationFailed => "Correct the input and run again",
        ErrorKind::GenerationFailed => "Nothing was saved; try again later",
        ErrorKind::PersistFailed => "The generated content was not saved; try again",
    }
}
