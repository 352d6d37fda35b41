//! Functional tests for the enrichment pipeline.
//!
//! Exercises the pipeline end to end against the in-memory store wrapper:
//! - Steps never reach the generator on an incomplete profile.
//! - Artifacts are merged under their field's policy.
//! - Concurrent list writers do not lose items.
//! - A failed save can be retried without generating again.

use pathfinder_core::{
    EnrichmentError, EnrichmentPipeline, FocusArea, FocusSelection, GenerationError,
    IdeasStep, PendingWrite, PipelineConfig, ReportStep, RoutePlanStep, StepKind,
    SynthesisStep,
};
use pathfinder_profile::{GeneratedField, ListField, ProfileField, ProfilePatch, Revision};
use pathfinder_store::AggregateStore;
use pathfinder_test_utils::{
    planning_profile, profile_missing, profile_with_typology, strings, user, FaultyStore,
    ScriptedGenerator,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn pipeline(store: &Arc<FaultyStore>, generator: &Arc<ScriptedGenerator>) -> EnrichmentPipeline {
    EnrichmentPipeline::new(
        store.clone(),
        generator.clone(),
        PipelineConfig::default(),
    )
}

/// Tenet: a report precheck on a profile missing `trifix` names it and
/// never calls the generator.
#[tokio::test]
async fn missing_trifix_blocks_report_before_generation() {
    let profile = profile_missing("u1", ProfileField::Trifix);
    let store = Arc::new(FaultyStore::new().with_profile(profile.clone()));
    let generator = Arc::new(ScriptedGenerator::new().with_report("unused"));

    let readiness = pathfinder_core::validate(StepKind::Report, &profile);
    assert!(!readiness.is_ready());
    assert!(readiness.missing().contains(&ProfileField::Trifix));

    let err = pipeline(&store, &generator)
        .run(&ReportStep, &profile, ())
        .await
        .unwrap_err();

    assert!(matches!(
        &err,
        EnrichmentError::PreconditionFailed { step: StepKind::Report, missing }
            if missing == &vec![ProfileField::Trifix]
    ));
    assert_eq!(generator.calls().total(), 0);
    assert_eq!(store.inner().report_count(), 0);
    assert_eq!(store.merge_calls(), 0);
}

/// Tenet: ideas accumulate append-unique across runs.
///
/// Responses `["A","B"]` then `["B","C"]` on an empty list must leave
/// exactly `["A","B","C"]`.
#[tokio::test]
async fn ideas_accumulate_without_duplicates() {
    let store = Arc::new(FaultyStore::new().with_profile(profile_with_typology("u1")));
    let generator = Arc::new(
        ScriptedGenerator::new()
            .with_ideas(&["A", "B"])
            .with_ideas(&["B", "C"]),
    );
    let pipeline = pipeline(&store, &generator);
    let step = IdeasStep::default();

    pipeline.run_for_user(&step, &user("u1"), ()).await.unwrap();
    let second = pipeline.run_for_user(&step, &user("u1"), ()).await.unwrap();

    let profile = store.get(&user("u1")).await.unwrap();
    assert_eq!(profile.career_ideas, strings(&["A", "B", "C"]));
    assert_eq!(second.receipt.revision, profile.revision);

    let requests = generator.ideas_requests();
    assert_eq!(requests[1].profile.existing_ideas, strings(&["A", "B"]));
}

/// Tenet: a concurrent writer between read and write does not lose items.
///
/// Another writer appends "X" after the step read the profile. The step's
/// conditional write conflicts, re-reads, re-merges, and keeps both.
#[tokio::test]
async fn conflicting_list_write_is_remerged() {
    let profile = profile_with_typology("u1");
    let store = Arc::new(FaultyStore::new().with_profile(profile.clone()));
    store.interleave(ProfilePatch::new().with_list(ListField::CareerIdeas, strings(&["X"])));

    let generator = Arc::new(ScriptedGenerator::new().with_ideas(&["A", "X", "B"]));
    let outcome = pipeline(&store, &generator)
        .run(&IdeasStep::default(), &profile, ())
        .await
        .unwrap();

    let stored = store.get(&user("u1")).await.unwrap();
    assert_eq!(stored.career_ideas, strings(&["X", "A", "B"]));
    assert_eq!(outcome.receipt.revision, Revision(2));
    assert_eq!(generator.calls().ideas, 1);
}

/// Tenet: conflicts beyond the retry budget surface as a retryable persist
/// failure, and the generator is still called only once.
#[tokio::test]
async fn exhausted_retries_return_pending_write() {
    let mut profile = profile_with_typology("u1");
    profile.career_ideas = strings(&["Z"]);
    let store = Arc::new(FaultyStore::new().with_profile(profile.clone()));
    // Each concurrent writer sees the previous one's skills and adds its own.
    for i in 0..3 {
        let skills = (0..=i).map(|n| format!("skill-{n}")).collect();
        store.interleave(ProfilePatch::new().with_list(ListField::Skills, skills));
    }

    let generator = Arc::new(ScriptedGenerator::new().with_ideas(&["A"]));
    let pipeline = pipeline(&store, &generator);
    let err = pipeline
        .run(&IdeasStep::default(), &profile, ())
        .await
        .unwrap_err();

    assert!(matches!(&err, EnrichmentError::PersistFailed { cause, .. } if cause.is_conflict()));
    let pending = err.into_pending().unwrap();
    assert_eq!(
        pending,
        PendingWrite::AppendList {
            user_id: user("u1"),
            field: ListField::CareerIdeas,
            items: strings(&["A"]),
        }
    );

    pipeline.retry_persist(pending).await.unwrap();
    let stored = store.get(&user("u1")).await.unwrap();
    assert_eq!(stored.career_ideas, strings(&["Z", "A"]));
    assert_eq!(stored.skills, strings(&["skill-0", "skill-1", "skill-2"]));
    assert_eq!(generator.calls().ideas, 1);
}

/// Tenet: concurrent idea runs for the same user never lose each other's
/// items.
#[tokio::test]
async fn parallel_idea_runs_keep_every_item() {
    let store = Arc::new(FaultyStore::new().with_profile(profile_with_typology("u1")));
    let mut handles = Vec::new();

    for batch in [["A", "B"], ["C", "D"], ["B", "E"]] {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let generator = Arc::new(ScriptedGenerator::new().with_ideas(&batch));
            let pipeline = EnrichmentPipeline::new(
                store,
                generator,
                PipelineConfig::default().with_max_merge_attempts(10),
            );
            pipeline
                .run_for_user(&IdeasStep::default(), &user("u1"), ())
                .await
                .map(|_| ())
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mut ideas = store.get(&user("u1")).await.unwrap().career_ideas;
    ideas.sort();
    assert_eq!(ideas, strings(&["A", "B", "C", "D", "E"]));
}

/// Tenet: the route plan fully replaces the previous plan.
#[tokio::test]
async fn route_plan_replaces_previous_value() {
    let mut profile = planning_profile("u1", 10.0, "job 40h/wk", "3 months");
    profile.route_plan = Some("old plan".into());
    let store = Arc::new(FaultyStore::new().with_profile(profile));
    let generator = Arc::new(ScriptedGenerator::new().with_plan("Month 1: shadow a mentor"));

    let outcome = pipeline(&store, &generator)
        .run_for_user(&RoutePlanStep, &user("u1"), ())
        .await
        .unwrap();

    assert!(!outcome.artifact.is_empty());
    let stored = store.get(&user("u1")).await.unwrap();
    assert_eq!(stored.route_plan.as_deref(), Some("Month 1: shadow a mentor"));
}

/// Tenet: "career", "contribution" and "calling" run disjoint steps and
/// write disjoint fields.
#[tokio::test]
async fn focus_selection_routes_to_disjoint_fields() {
    let store = Arc::new(FaultyStore::new().with_profile(profile_with_typology("u1")));
    let generator = Arc::new(
        ScriptedGenerator::new()
            .with_ideas(&["Cartographer"])
            .with_synthesis("Mapping hidden places"),
    );
    let pipeline = pipeline(&store, &generator);

    for name in ["career", "calling"] {
        match FocusSelection::parse(name).unwrap() {
            FocusSelection::Career => {
                pipeline
                    .run_for_user(&IdeasStep::default(), &user("u1"), ())
                    .await
                    .unwrap();
            }
            FocusSelection::Synthesis(area) => {
                pipeline
                    .run_for_user(&SynthesisStep, &user("u1"), area)
                    .await
                    .unwrap();
            }
        }
    }

    let stored = store.get(&user("u1")).await.unwrap();
    assert_eq!(stored.career_ideas, strings(&["Cartographer"]));
    assert_eq!(stored.calling_profile.as_deref(), Some("Mapping hidden places"));
    assert_eq!(stored.contribution_profile, None);
    assert_eq!(
        generator.synthesis_requests()[0].focus_area,
        FocusArea::Calling
    );
}

/// Tenet: a report whose record was saved but whose pointer write failed is
/// retried as a pointer-only write; no second record is created.
#[tokio::test]
async fn report_retry_does_not_duplicate_records() {
    let store = Arc::new(FaultyStore::new().with_profile(profile_with_typology("u1")));
    let generator = Arc::new(ScriptedGenerator::new().with_report("A life of making"));
    let pipeline = pipeline(&store, &generator);

    store.fail_next_merges(1);
    let err = pipeline
        .run_for_user(&ReportStep, &user("u1"), ())
        .await
        .unwrap_err();
    assert!(err.is_retryable());

    let pending = err.into_pending().unwrap();
    let PendingWrite::SetReportPointer { report_id, .. } = pending else {
        panic!("expected a pointer-only write, got {pending:?}");
    };

    let receipt = pipeline.retry_persist(pending).await.unwrap();
    assert_eq!(receipt.report_id, Some(report_id));
    assert_eq!(store.inner().report_count(), 1);
    assert_eq!(
        store.get(&user("u1")).await.unwrap().life_purpose_report_id,
        Some(report_id)
    );

    let report = store.get_report(report_id).await.unwrap();
    assert_eq!(report.typology.trifix.as_deref(), Some("451"));
}

/// Tenet: a failed report creation hands back the full report write.
#[tokio::test]
async fn failed_report_creation_is_retryable() {
    let store = Arc::new(FaultyStore::new().with_profile(profile_with_typology("u1")));
    let generator = Arc::new(ScriptedGenerator::new().with_report("A life of making"));
    let pipeline = pipeline(&store, &generator);

    store.fail_next_reports(1);
    let err = pipeline
        .run_for_user(&ReportStep, &user("u1"), ())
        .await
        .unwrap_err();
    let pending = err.into_pending().unwrap();
    assert!(matches!(pending, PendingWrite::NewReport { .. }));
    assert_eq!(store.inner().report_count(), 0);

    let receipt = pipeline.retry_persist(pending).await.unwrap();
    assert!(receipt.report_id.is_some());
    assert_eq!(store.inner().report_count(), 1);
    assert_eq!(generator.calls().report, 1);
}

/// Tenet: generation failures are distinct from persist failures and leave
/// the profile untouched.
#[tokio::test]
async fn generation_failure_writes_nothing() {
    let profile = planning_profile("u1", 4.0, "caregiving", "1 year");
    let store = Arc::new(FaultyStore::new().with_profile(profile.clone()));
    let generator = Arc::new(ScriptedGenerator::new().with_plan_error(GenerationError::Timeout));

    let err = pipeline(&store, &generator)
        .run_for_user(&RoutePlanStep, &user("u1"), ())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EnrichmentError::GenerationFailed {
            step: StepKind::RoutePlan,
            cause: GenerationError::Timeout
        }
    ));
    assert_eq!(store.merge_calls(), 0);
    assert_eq!(store.get(&user("u1")).await.unwrap(), profile);
}

/// Tenet: an all-blank idea list is a generation failure, not an empty write.
#[tokio::test]
async fn blank_ideas_are_a_generation_failure() {
    let store = Arc::new(FaultyStore::new().with_profile(profile_with_typology("u1")));
    let generator = Arc::new(ScriptedGenerator::new().with_ideas(&["  ", ""]));

    let err = pipeline(&store, &generator)
        .run_for_user(&IdeasStep::default(), &user("u1"), ())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EnrichmentError::GenerationFailed {
            cause: GenerationError::EmptyResponse,
            ..
        }
    ));
    assert_eq!(store.merge_calls(), 0);
}

/// Tenet: replacing generated text only touches the targeted field.
#[tokio::test]
async fn synthesis_keeps_unrelated_fields() {
    let mut profile = profile_with_typology("u1");
    profile.skills = strings(&["welding"]);
    profile.route_plan = Some("keep me".into());
    let store = Arc::new(FaultyStore::new().with_profile(profile));
    let generator = Arc::new(ScriptedGenerator::new().with_synthesis("Building shelter"));

    pipeline(&store, &generator)
        .run_for_user(&SynthesisStep, &user("u1"), FocusArea::Contribution)
        .await
        .unwrap();

    let stored = store.get(&user("u1")).await.unwrap();
    assert_eq!(
        stored.generated(GeneratedField::ContributionProfile),
        Some("Building shelter")
    );
    assert_eq!(stored.skills, strings(&["welding"]));
    assert_eq!(stored.route_plan.as_deref(), Some("keep me"));
}
