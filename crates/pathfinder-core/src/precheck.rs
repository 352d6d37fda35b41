//! Readiness checks run before any generative call
//!
//! Each step declares the profile fields it reads. A step may only run when
//! all of them are present. Text must be non-blank; hours only need to be
//! set, their range is checked by the step itself.

use pathfinder_profile::{Profile, ProfileField};
use serde::{Deserialize, Serialize};

/// The generative enrichment steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Life-purpose narrative report
    Report,
    /// Career idea list
    Ideas,
    /// Contribution or calling synthesis
    Synthesis,
    /// Route plan from planning inputs
    RoutePlan,
}

impl StepKind {
    /// All steps
    pub const ALL: [Self; 4] = [Self::Report, Self::Ideas, Self::Synthesis, Self::RoutePlan];

    /// Log and metric label
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::Ideas => "ideas",
            Self::Synthesis => "synthesis",
            Self::RoutePlan => "route_plan",
        }
    }

    /// Fields that must be present before this step may run
    #[must_use]
    pub fn required_fields(&self) -> &'static [ProfileField] {
        match self {
            Self::Report | Self::Ideas | Self::Synthesis => &ProfileField::TYPOLOGY,
            Self::RoutePlan => &ProfileField::PLANNING,
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a precheck
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// All required fields present
    Ready,
    /// Required fields absent, in declaration order
    NotReady {
        /// Absent fields
        missing: Vec<ProfileField>,
    },
}

impl Readiness {
    /// All inputs present
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Absent fields; empty when ready
    #[must_use]
    pub fn missing(&self) -> &[ProfileField] {
        match self {
            Self::Ready => &[],
            Self::NotReady { missing } => missing,
        }
    }
}

/// Check whether `step` can run against `profile`
///
/// Pure: reads only the profile snapshot it is given.
#[must_use]
pub fn validate(step: StepKind, profile: &Profile) -> Readiness {
    let missing: Vec<ProfileField> = step
        .required_fields()
        .iter()
        .copied()
        .filter(|field| !profile.is_present(*field))
        .collect();

    if missing.is_empty() {
        Readiness::Ready
    } else {
        Readiness::NotReady { missing }
    }
}
