//! Enrichment pipeline
//!
//! Runs one step end to end: precheck, input validation, generation, then
//! a write under the target field's merge policy.
//!
//! # Persistence
//! - Reports create a new record, then point the profile at it.
//! - Career ideas are merged append-unique under a revision precondition,
//!   re-reading and re-merging on conflict. Generation is never repeated.
//! - Generated text fields are replaced unconditionally.
//!
//! A failed save returns the [`PendingWrite`] so it can be retried with
//! [`EnrichmentPipeline::retry_persist`].

use crate::config::PipelineConfig;
use crate::error::EnrichmentError;
use crate::generative::GenerativeService;
use crate::occ::{write_with_policy, OccError};
use crate::precheck::{self, Readiness, StepKind};
use crate::steps::{CommitReceipt, EnrichmentStep, PendingWrite, StepOutcome};
use pathfinder_profile::{Profile, ProfilePatch, ReportId, UserId};
use pathfinder_store::{AggregateStore, StoreError, WritePrecondition};
use std::convert::Infallible;
use std::sync::Arc;

/// Orchestrates enrichment steps over an injected store and generator
#[derive(Clone)]
pub struct EnrichmentPipeline {
    store: Arc<dyn AggregateStore>,
    generator: Arc<dyn GenerativeService>,
    config: PipelineConfig,
}

impl std::fmt::Debug for EnrichmentPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichmentPipeline")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EnrichmentPipeline {
    /// Create a pipeline
    #[must_use]
    pub fn new(
        store: Arc<dyn AggregateStore>,
        generator: Arc<dyn GenerativeService>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            generator,
            config,
        }
    }

    /// Store handle
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<dyn AggregateStore> {
        &self.store
    }

    /// Pipeline settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run `step` against a profile snapshot and persist the artifact
    ///
    /// No generator call is made unless the precheck passes and the input
    /// is valid.
    ///
    /// # Errors
    /// See [`EnrichmentError`]
    pub async fn run<S: EnrichmentStep>(
        &self,
        step: &S,
        profile: &Profile,
        input: S::Input,
    ) -> Result<StepOutcome<S::Artifact>, EnrichmentError> {
        let kind = step.kind();
        let result = self.execute(step, profile, &input).await;
        record_outcome(kind, result.as_ref().map(|_| ()));
        result
    }

    /// Load the user's profile, then [`run`](Self::run)
    ///
    /// An unknown user fails the precheck with every required field missing.
    ///
    /// # Errors
    /// See [`EnrichmentError`]
    pub async fn run_for_user<S: EnrichmentStep>(
        &self,
        step: &S,
        user: &UserId,
        input: S::Input,
    ) -> Result<StepOutcome<S::Artifact>, EnrichmentError> {
        let kind = step.kind();
        match self.store.get(user).await {
            Ok(profile) => self.run(step, &profile, input).await,
            Err(err) => {
                let err = if err.is_not_found() {
                    tracing::debug!("No profile for {}, {} step not ready", user, kind);
                    EnrichmentError::PreconditionFailed {
                        step: kind,
                        missing: kind.required_fields().to_vec(),
                    }
                } else {
                    tracing::error!("Failed to load profile {}: {}", user, err);
                    EnrichmentError::PersistFailed {
                        step: kind,
                        cause: err,
                        pending: None,
                    }
                };
                record_outcome(kind, Err(&err));
                Err(err)
            }
        }
    }

    /// Retry the save of a previously generated artifact
    ///
    /// # Errors
    /// [`EnrichmentError::PersistFailed`], again carrying the write
    pub async fn retry_persist(
        &self,
        pending: PendingWrite,
    ) -> Result<CommitReceipt, EnrichmentError> {
        tracing::info!(
            "Retrying {} write to {} for {}",
            pending.step(),
            pending.target(),
            pending.user_id()
        );
        self.commit(pending, None).await
    }

    async fn execute<S: EnrichmentStep>(
        &self,
        step: &S,
        profile: &Profile,
        input: &S::Input,
    ) -> Result<StepOutcome<S::Artifact>, EnrichmentError> {
        let kind = step.kind();

        if let Readiness::NotReady { missing } = precheck::validate(kind, profile) {
            tracing::debug!(
                "{} step not ready for {}: {} field(s) missing",
                kind,
                profile.user_id,
                missing.len()
            );
            return Err(EnrichmentError::PreconditionFailed { step: kind, missing });
        }

        let request = step
            .prepare(profile, input)
            .map_err(|cause| EnrichmentError::ValidationFailed { step: kind, cause })?;

        tracing::info!("Running {} step for {}", kind, profile.user_id);
        let artifact = step
            .generate(request, self.generator.as_ref())
            .await
            .map_err(|cause| {
                tracing::error!("{} generation failed for {}: {}", kind, profile.user_id, cause);
                EnrichmentError::GenerationFailed { step: kind, cause }
            })?;

        let pending = step.pending_write(&profile.user_id, &artifact);
        let receipt = self.commit(pending, Some(profile)).await?;

        tracing::info!(
            "Committed {} step for {} at {}",
            kind,
            profile.user_id,
            receipt.revision
        );
        Ok(StepOutcome { artifact, receipt })
    }

    async fn commit(
        &self,
        pending: PendingWrite,
        snapshot: Option<&Profile>,
    ) -> Result<CommitReceipt, EnrichmentError> {
        let step = pending.step();
        let persist_failed = |cause: StoreError, pending: PendingWrite| {
            tracing::error!("{} persist failed for {}: {}", step, pending.user_id(), cause);
            EnrichmentError::PersistFailed {
                step,
                cause,
                pending: Some(Box::new(pending)),
            }
        };

        match pending {
            PendingWrite::NewReport { draft } => {
                let user = draft.user_id.clone();
                let report_id = match self.store.create_report(draft.clone()).await {
                    Ok(id) => id,
                    Err(cause) => {
                        return Err(persist_failed(cause, PendingWrite::NewReport { draft }))
                    }
                };
                tracing::debug!("Stored report {} for {}", report_id, user);
                self.point_to_report(user, report_id)
                    .await
                    .map_err(|(cause, pending)| persist_failed(cause, pending))
            }

            PendingWrite::SetReportPointer { user_id, report_id } => self
                .point_to_report(user_id, report_id)
                .await
                .map_err(|(cause, pending)| persist_failed(cause, pending)),

            PendingWrite::AppendList { .. } | PendingWrite::ReplaceText { .. } => {
                let user_id = pending.user_id().clone();
                let seed = snapshot.filter(|p| p.user_id == user_id).cloned();
                let result = write_with_policy(
                    self.store.as_ref(),
                    &user_id,
                    pending.target(),
                    self.config.max_merge_attempts,
                    seed,
                    step.name(),
                    |profile| -> Result<_, Infallible> { Ok(pending.patch_for(profile)) },
                )
                .await;

                match result {
                    Ok(revision) => Ok(CommitReceipt {
                        revision,
                        report_id: None,
                    }),
                    Err(OccError::Rejected(never)) => match never {},
                    Err(OccError::Store(cause) | OccError::Exhausted { last: cause, .. }) => {
                        Err(persist_failed(cause, pending))
                    }
                }
            }
        }
    }

    /// Repoint the profile; on failure hand back a pointer-only write so the
    /// report record is not created twice
    async fn point_to_report(
        &self,
        user_id: UserId,
        report_id: ReportId,
    ) -> Result<CommitReceipt, (StoreError, PendingWrite)> {
        let patch = ProfilePatch::new().with_report(report_id);
        match self
            .store
            .merge_patch(&user_id, &patch, WritePrecondition::Any)
            .await
        {
            Ok(revision) => Ok(CommitReceipt {
                revision,
                report_id: Some(report_id),
            }),
            Err(cause) => Err((
                cause,
                PendingWrite::SetReportPointer { user_id, report_id },
            )),
        }
    }
}

fn record_outcome(step: StepKind, result: Result<(), &EnrichmentError>) {
    let outcome = match result {
        Ok(()) => "ok",
        Err(err) => err.kind().label(),
    };
    metrics::counter!(
        "pathfinder_step_runs_total",
        "step" => step.name(),
        "outcome" => outcome
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GenerationError, InputError};
    use crate::generative::{
        IdeasResponse, MockGenerativeService, PlanResponse, ReportResponse, SynthesisResponse,
    };
    use crate::steps::{FocusArea, IdeasStep, ReportStep, RoutePlanStep, SynthesisStep};
    use pathfinder_profile::{ProfileField, Typology};
    use pathfinder_store::InMemoryStore;
    use pretty_assertions::assert_eq;

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    fn typology() -> Typology {
        Typology::new("4", "4w5", "sx", "sx/sp", "451")
    }

    async fn seeded(profile: Profile) -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store.insert_profile(profile);
        store
    }

    fn pipeline(store: Arc<InMemoryStore>, mock: MockGenerativeService) -> EnrichmentPipeline {
        EnrichmentPipeline::new(store, Arc::new(mock), PipelineConfig::default())
    }

    #[tokio::test]
    async fn precheck_failure_makes_no_generator_call() {
        let mut partial = typology();
        partial.trifix = None;
        let profile = Profile::new(user()).with_typology(partial);
        let store = seeded(profile.clone()).await;

        let mut mock = MockGenerativeService::new();
        mock.expect_report().never();
        mock.expect_ideas().never();
        mock.expect_synthesis().never();
        mock.expect_plan().never();
        let pipeline = pipeline(Arc::clone(&store), mock);

        let err = pipeline.run(&ReportStep, &profile, ()).await.unwrap_err();
        assert_eq!(err.missing_fields(), &[ProfileField::Trifix]);

        let err = pipeline
            .run(&SynthesisStep, &profile, FocusArea::Calling)
            .await
            .unwrap_err();
        assert!(err.is_user_recoverable());

        let err = pipeline.run(&RoutePlanStep, &profile, ()).await.unwrap_err();
        assert_eq!(err.missing_fields(), &ProfileField::PLANNING);

        assert_eq!(store.report_count(), 0);
        assert_eq!(store.get(&user()).await.unwrap(), profile);
    }

    #[tokio::test]
    async fn invalid_hours_fail_validation_before_generation() {
        let profile = Profile::new(user()).with_planning(0.0, "job", "1 year");
        let store = seeded(profile.clone()).await;

        let mut mock = MockGenerativeService::new();
        mock.expect_plan().never();

        let err = pipeline(store, mock)
            .run(&RoutePlanStep, &profile, ())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EnrichmentError::ValidationFailed {
                step: StepKind::RoutePlan,
                cause: InputError::NonPositiveHours(_)
            }
        ));
    }

    #[tokio::test]
    async fn report_run_creates_record_and_repoints() {
        let profile = Profile::new(user()).with_typology(typology());
        let store = seeded(profile.clone()).await;

        let mut mock = MockGenerativeService::new();
        mock.expect_report().times(2).returning(|_| {
            Ok(ReportResponse {
                report: "narrative".into(),
            })
        });
        let pipeline = pipeline(Arc::clone(&store), mock);

        let first = pipeline.run(&ReportStep, &profile, ()).await.unwrap();
        let second = pipeline.run_for_user(&ReportStep, &user(), ()).await.unwrap();

        let first_id = first.receipt.report_id.unwrap();
        let second_id = second.receipt.report_id.unwrap();
        assert_ne!(first_id, second_id);
        assert_eq!(store.report_count(), 2);
        assert_eq!(
            store.get(&user()).await.unwrap().life_purpose_report_id,
            Some(second_id)
        );
        assert_eq!(store.get_report(first_id).await.unwrap().report, "narrative");
    }

    #[tokio::test]
    async fn ideas_append_unique_to_existing() {
        let mut profile = Profile::new(user()).with_typology(typology());
        profile.career_ideas = vec!["A".into(), "B".into()];
        let store = seeded(profile.clone()).await;

        let mut mock = MockGenerativeService::new();
        mock.expect_ideas().times(1).returning(|_| {
            Ok(IdeasResponse {
                ideas: vec!["B".into(), "C".into()],
            })
        });

        let outcome = pipeline(Arc::clone(&store), mock)
            .run(&IdeasStep::default(), &profile, ())
            .await
            .unwrap();

        assert_eq!(outcome.artifact, vec!["B".to_string(), "C".to_string()]);
        assert_eq!(
            store.get(&user()).await.unwrap().career_ideas,
            vec!["A".to_string(), "B".to_string(), "C".to_string()]
        );
    }

    #[tokio::test]
    async fn synthesis_replaces_only_its_field() {
        let mut profile = Profile::new(user()).with_typology(typology());
        profile.contribution_profile = Some("old contribution".into());
        profile.calling_profile = Some("old calling".into());
        let store = seeded(profile.clone()).await;

        let mut mock = MockGenerativeService::new();
        mock.expect_synthesis().returning(|_| {
            Ok(SynthesisResponse {
                text: "new contribution".into(),
            })
        });

        pipeline(Arc::clone(&store), mock)
            .run(&SynthesisStep, &profile, FocusArea::Contribution)
            .await
            .unwrap();

        let stored = store.get(&user()).await.unwrap();
        assert_eq!(stored.contribution_profile.as_deref(), Some("new contribution"));
        assert_eq!(stored.calling_profile.as_deref(), Some("old calling"));
    }

    #[tokio::test]
    async fn generation_error_leaves_profile_untouched() {
        let profile = Profile::new(user()).with_planning(5.0, "job", "6 months");
        let store = seeded(profile.clone()).await;

        let mut mock = MockGenerativeService::new();
        mock.expect_plan()
            .times(1)
            .returning(|_| Err(GenerationError::Timeout));

        let err = pipeline(Arc::clone(&store), mock)
            .run(&RoutePlanStep, &profile, ())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EnrichmentError::GenerationFailed {
                cause: GenerationError::Timeout,
                ..
            }
        ));
        assert_eq!(store.get(&user()).await.unwrap(), profile);
    }

    #[tokio::test]
    async fn unknown_user_is_not_ready() {
        let store = Arc::new(InMemoryStore::new());
        let mut mock = MockGenerativeService::new();
        mock.expect_plan().never();

        let err = pipeline(store, mock)
            .run_for_user(&RoutePlanStep, &user(), ())
            .await
            .unwrap_err();
        assert_eq!(err.missing_fields(), &ProfileField::PLANNING);
    }

    #[tokio::test]
    async fn persist_failure_returns_retryable_write() {
        // Snapshot for a user the store does not hold: generation succeeds,
        // the replace write fails.
        let profile = Profile::new(user()).with_planning(5.0, "job", "6 months");
        let store = Arc::new(InMemoryStore::new());

        let mut mock = MockGenerativeService::new();
        mock.expect_plan().times(1).returning(|_| {
            Ok(PlanResponse {
                plan: "Week 1: explore".into(),
            })
        });
        let pipeline = pipeline(Arc::clone(&store), mock);

        let err = pipeline.run(&RoutePlanStep, &profile, ()).await.unwrap_err();
        assert!(err.is_retryable());
        let pending = err.into_pending().unwrap();

        store.insert_profile(profile);
        let receipt = pipeline.retry_persist(pending).await.unwrap();

        assert_eq!(receipt.revision, pathfinder_profile::Revision(1));
        assert_eq!(
            store.get(&user()).await.unwrap().route_plan.as_deref(),
            Some("Week 1: explore")
        );
    }
}
