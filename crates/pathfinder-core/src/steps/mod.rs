//! Enrichment steps
//!
//! A step turns a profile snapshot into one artifact in three phases:
//!
//! 1. [`EnrichmentStep::prepare`]: build the typed request (pure)
//! 2. [`EnrichmentStep::generate`]: one call to the [`GenerativeService`]
//! 3. [`EnrichmentStep::pending_write`]: describe how the artifact is saved
//!
//! Prechecks and persistence are owned by the pipeline, so a step never
//! touches the store and never runs on an incomplete profile.

mod ideas;
mod report;
mod route_plan;
mod synthesis;

pub use ideas::{normalize_ideas, IdeasStep};
pub use report::{GeneratedReport, ReportStep};
pub use route_plan::{validate_hours, RoutePlanStep};
pub use synthesis::{SynthesisStep, SynthesizedText};

use crate::error::{GenerationError, InputError};
use crate::generative::GenerativeService;
use crate::precheck::StepKind;
use async_trait::async_trait;
use pathfinder_merge::append_unique;
use pathfinder_profile::{
    GeneratedField, ListField, Profile, ProfileField, ProfilePatch, ReportDraft, ReportId,
    Revision, UserId,
};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::str::FromStr;

/// One generative enrichment step
#[async_trait]
pub trait EnrichmentStep: Send + Sync + Debug {
    /// Caller-supplied input besides the profile
    type Input: Send + Sync + Debug;

    /// Typed request sent to the generator
    type Request: Send + Debug;

    /// What the step produces
    type Artifact: Clone + Send + Sync + Debug;

    /// Which step this is
    fn kind(&self) -> StepKind;

    /// Build the generator request from a ready profile
    ///
    /// # Errors
    /// [`InputError`] if the input or a profile value is malformed
    fn prepare(&self, profile: &Profile, input: &Self::Input) -> Result<Self::Request, InputError>;

    /// Call the generator and shape the result
    async fn generate(
        &self,
        request: Self::Request,
        generator: &dyn GenerativeService,
    ) -> Result<Self::Artifact, GenerationError>;

    /// Write that persists `artifact` for `user`
    fn pending_write(&self, user: &UserId, artifact: &Self::Artifact) -> PendingWrite;
}

/// A generated artifact waiting to be persisted
///
/// Returned inside persist failures so the save can be retried without
/// generating again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingWrite {
    /// Create a report record, then point the profile at it
    NewReport {
        /// Report content
        draft: ReportDraft,
    },

    /// Point the profile at an already stored report
    SetReportPointer {
        /// Owner
        user_id: UserId,
        /// Stored report
        report_id: ReportId,
    },

    /// Append-unique into a list field
    AppendList {
        /// Owner
        user_id: UserId,
        /// Target list
        field: ListField,
        /// New items
        items: Vec<String>,
    },

    /// Replace a generated text field
    ReplaceText {
        /// Owner
        user_id: UserId,
        /// Target field
        field: GeneratedField,
        /// New text
        text: String,
    },
}

impl PendingWrite {
    /// Profile the write targets
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        match self {
            Self::NewReport { draft } => &draft.user_id,
            Self::SetReportPointer { user_id, .. }
            | Self::AppendList { user_id, .. }
            | Self::ReplaceText { user_id, .. } => user_id,
        }
    }

    /// Step that produced the write
    #[must_use]
    pub fn step(&self) -> StepKind {
        match self {
            Self::NewReport { .. } | Self::SetReportPointer { .. } => StepKind::Report,
            Self::AppendList { .. } => StepKind::Ideas,
            Self::ReplaceText {
                field: GeneratedField::RoutePlan,
                ..
            } => StepKind::RoutePlan,
            Self::ReplaceText { .. } => StepKind::Synthesis,
        }
    }

    /// Profile field the write ends up in
    #[must_use]
    pub fn target(&self) -> ProfileField {
        match self {
            Self::NewReport { .. } | Self::SetReportPointer { .. } => {
                ProfileField::LifePurposeReportId
            }
            Self::AppendList { field, .. } => field.field(),
            Self::ReplaceText { field, .. } => field.field(),
        }
    }

    /// Patch that applies this write to `current`; `None` when there is
    /// nothing left to change
    ///
    /// A new report has no profile patch until its record exists.
    pub(crate) fn patch_for(&self, current: &Profile) -> Option<ProfilePatch> {
        match self {
            Self::NewReport { .. } => None,
            Self::SetReportPointer { report_id, .. } => {
                Some(ProfilePatch::new().with_report(*report_id))
            }
            Self::AppendList { field, items, .. } => {
                let existing = current.list(*field);
                let merged = append_unique(existing, items.iter().cloned());
                (merged.len() != existing.len())
                    .then(|| ProfilePatch::new().with_list(*field, merged))
            }
            Self::ReplaceText { field, text, .. } => {
                Some(ProfilePatch::new().with_generated(*field, text.clone()))
            }
        }
    }
}

/// Where a committed artifact landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Profile revision after the write
    pub revision: Revision,
    /// Report record created, for report steps
    pub report_id: Option<ReportId>,
}

/// Result of a successful step run
#[derive(Debug, Clone)]
pub struct StepOutcome<A> {
    /// Generated artifact
    pub artifact: A,
    /// Persistence receipt
    pub receipt: CommitReceipt,
}

/// Synthesis target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusArea {
    /// How the user contributes
    Contribution,
    /// What the user is called to
    Calling,
}

impl FocusArea {
    /// Field the synthesized text replaces
    #[inline]
    #[must_use]
    pub fn target(&self) -> GeneratedField {
        match self {
            Self::Contribution => GeneratedField::ContributionProfile,
            Self::Calling => GeneratedField::CallingProfile,
        }
    }

    /// Wire name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Contribution => "contribution",
            Self::Calling => "calling",
        }
    }
}

impl std::fmt::Display for FocusArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// User-facing focus choice, routed to a step
///
/// `career` produces ideas; `contribution` and `calling` produce synthesis
/// text. The three never share a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusSelection {
    /// Career ideas
    Career,
    /// Synthesis of one focus area
    Synthesis(FocusArea),
}

impl FocusSelection {
    /// Parse a selection name (case-insensitive)
    ///
    /// # Errors
    /// [`InputError::UnknownFocusArea`] for any other name
    pub fn parse(value: &str) -> Result<Self, InputError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "career" => Ok(Self::Career),
            "contribution" => Ok(Self::Synthesis(FocusArea::Contribution)),
            "calling" => Ok(Self::Synthesis(FocusArea::Calling)),
            _ => Err(InputError::UnknownFocusArea(value.to_string())),
        }
    }

    /// Step this selection runs
    #[inline]
    #[must_use]
    pub fn step(&self) -> StepKind {
        match self {
            Self::Career => StepKind::Ideas,
            Self::Synthesis(_) => StepKind::Synthesis,
        }
    }
}

impl FromStr for FocusSelection {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl FromStr for FocusArea {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match FocusSelection::parse(s)? {
            FocusSelection::Synthesis(area) => Ok(area),
            FocusSelection::Career => Err(InputError::UnknownFocusArea(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathfinder_profile::Typology;

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    #[test]
    fn focus_routing_is_disjoint() {
        assert_eq!(FocusSelection::parse("career").unwrap().step(), StepKind::Ideas);
        assert_eq!(
            FocusSelection::parse("Contribution").unwrap(),
            FocusSelection::Synthesis(FocusArea::Contribution)
        );
        assert_eq!(
            "calling".parse::<FocusSelection>().unwrap().step(),
            StepKind::Synthesis
        );
        assert!(matches!(
            FocusSelection::parse("purpose"),
            Err(InputError::UnknownFocusArea(v)) if v == "purpose"
        ));
    }

    #[test]
    fn focus_area_rejects_career() {
        assert_eq!("calling".parse::<FocusArea>().unwrap(), FocusArea::Calling);
        assert!("career".parse::<FocusArea>().is_err());
        assert_eq!(FocusArea::Calling.target(), GeneratedField::CallingProfile);
    }

    #[test]
    fn pending_write_metadata() {
        let report = PendingWrite::NewReport {
            draft: ReportDraft {
                user_id: user(),
                report: "r".into(),
                typology: Typology::new("4", "4w5", "sx", "sx/sp", "451"),
            },
        };
        assert_eq!(report.step(), StepKind::Report);
        assert_eq!(report.user_id(), &user());
        assert_eq!(report.target(), ProfileField::LifePurposeReportId);

        let plan = PendingWrite::ReplaceText {
            user_id: user(),
            field: GeneratedField::RoutePlan,
            text: "p".into(),
        };
        assert_eq!(plan.step(), StepKind::RoutePlan);

        let calling = PendingWrite::ReplaceText {
            user_id: user(),
            field: GeneratedField::CallingProfile,
            text: "c".into(),
        };
        assert_eq!(calling.step(), StepKind::Synthesis);
        assert_eq!(calling.target(), ProfileField::CallingProfile);
    }

    #[test]
    fn list_patch_is_empty_when_nothing_is_new() {
        let mut profile = Profile::new(user());
        profile.career_ideas = vec!["A".into()];

        let repeat = PendingWrite::AppendList {
            user_id: user(),
            field: ListField::CareerIdeas,
            items: vec!["A".into()],
        };
        assert_eq!(repeat.patch_for(&profile), None);

        let fresh = PendingWrite::AppendList {
            user_id: user(),
            field: ListField::CareerIdeas,
            items: vec!["B".into(), "A".into()],
        };
        assert_eq!(
            fresh.patch_for(&profile),
            Some(ProfilePatch::new().with_list(ListField::CareerIdeas, vec!["A".into(), "B".into()]))
        );
        assert_eq!(fresh.target().merge_policy(), pathfinder_merge::MergePolicy::AppendUnique);
    }

    #[test]
    fn pending_write_serializes_with_kind_tag() {
        let write = PendingWrite::AppendList {
            user_id: user(),
            field: ListField::CareerIdeas,
            items: vec!["A".into()],
        };
        let json = serde_json::to_value(&write).unwrap();
        assert_eq!(json["kind"], "append_list");
        assert_eq!(json["field"], "careerIdeas");
    }
}
