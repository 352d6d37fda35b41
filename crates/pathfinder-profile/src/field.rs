//! Typed profile field names
//!
//! Every field of the aggregate has a stable camelCase wire name. Precheck
//! results, patch errors and log lines all refer to fields through
//! [`ProfileField`] rather than ad hoc strings.

use pathfinder_merge::MergePolicy;
use serde::{Deserialize, Serialize};

/// A named field of the profile aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileField {
    /// Enneagram type digit
    EnneagramType,
    /// Wing code, e.g. `4w5`
    Wing,
    /// Subtype code, e.g. `sx`
    Subtype,
    /// Instinctual stacking, e.g. `sx/sp`
    InstinctualStacking,
    /// Three-digit tritype
    Trifix,
    /// Ranked five-slot value selection
    CoreValues,
    /// Accumulated career ideas
    CareerIdeas,
    /// Accumulated skills
    Skills,
    /// Accumulated passions
    Passions,
    /// Accumulated interests
    Interests,
    /// Synthesized contribution text
    ContributionProfile,
    /// Synthesized calling text
    CallingProfile,
    /// Purpose text
    PurposeProfile,
    /// Generated route plan
    RoutePlan,
    /// Pointer to the live report record
    LifePurposeReportId,
    /// Weekly hours available
    AvailableHours,
    /// Existing commitments
    Commitments,
    /// Target timeline
    Timeline,
    /// Role clarity quiz result
    RoleClarityScore,
    /// Driver stage completed
    DriverCompleted,
    /// Destination stage completed
    DestinationCompleted,
    /// Route stage completed
    RouteCompleted,
}

impl ProfileField {
    /// The five fields forming the archetype key, in display order
    pub const TYPOLOGY: [Self; 5] = [
        Self::EnneagramType,
        Self::Wing,
        Self::Subtype,
        Self::InstinctualStacking,
        Self::Trifix,
    ];

    /// Inputs the route planner needs
    pub const PLANNING: [Self; 3] = [Self::AvailableHours, Self::Commitments, Self::Timeline];

    /// Wire (document) name
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::EnneagramType => "enneagramType",
            Self::Wing => "wing",
            Self::Subtype => "subtype",
            Self::InstinctualStacking => "instinctualStacking",
            Self::Trifix => "trifix",
            Self::CoreValues => "coreValues",
            Self::CareerIdeas => "careerIdeas",
            Self::Skills => "skills",
            Self::Passions => "passions",
            Self::Interests => "interests",
            Self::ContributionProfile => "contributionProfile",
            Self::CallingProfile => "callingProfile",
            Self::PurposeProfile => "purposeProfile",
            Self::RoutePlan => "routePlan",
            Self::LifePurposeReportId => "lifePurposeReportId",
            Self::AvailableHours => "availableHours",
            Self::Commitments => "commitments",
            Self::Timeline => "timeline",
            Self::RoleClarityScore => "roleClarityScore",
            Self::DriverCompleted => "driverCompleted",
            Self::DestinationCompleted => "destinationCompleted",
            Self::RouteCompleted => "routeCompleted",
        }
    }

    /// Policy new data is merged under
    #[must_use]
    pub fn merge_policy(&self) -> MergePolicy {
        match self {
            Self::CareerIdeas | Self::Skills | Self::Passions | Self::Interests => {
                MergePolicy::AppendUnique
            }
            Self::CoreValues => MergePolicy::AssignSlot,
            _ => MergePolicy::ReplaceScalar,
        }
    }
}

impl std::fmt::Display for ProfileField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Accumulating list fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListField {
    /// `careerIdeas`
    CareerIdeas,
    /// `skills`
    Skills,
    /// `passions`
    Passions,
    /// `interests`
    Interests,
}

impl ListField {
    /// All list fields
    pub const ALL: [Self; 4] = [Self::CareerIdeas, Self::Skills, Self::Passions, Self::Interests];

    /// Corresponding profile field
    #[inline]
    #[must_use]
    pub fn field(&self) -> ProfileField {
        match self {
            Self::CareerIdeas => ProfileField::CareerIdeas,
            Self::Skills => ProfileField::Skills,
            Self::Passions => ProfileField::Passions,
            Self::Interests => ProfileField::Interests,
        }
    }
}

/// Fully-replaced generated text fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeneratedField {
    /// `contributionProfile`
    ContributionProfile,
    /// `callingProfile`
    CallingProfile,
    /// `purposeProfile`
    PurposeProfile,
    /// `routePlan`
    RoutePlan,
}

impl GeneratedField {
    /// Corresponding profile field
    #[inline]
    #[must_use]
    pub fn field(&self) -> ProfileField {
        match self {
            Self::ContributionProfile => ProfileField::ContributionProfile,
            Self::CallingProfile => ProfileField::CallingProfile,
            Self::PurposeProfile => ProfileField::PurposeProfile,
            Self::RoutePlan => ProfileField::RoutePlan,
        }
    }
}

/// Wizard stages tracked by completion flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Milestone {
    /// Driver stage (typology, values, skills)
    Driver,
    /// Destination stage (purpose, ideas)
    Destination,
    /// Route stage (planning)
    Route,
}

impl Milestone {
    /// Completion flag backing this milestone
    #[inline]
    #[must_use]
    pub fn field(&self) -> ProfileField {
        match self {
            Self::Driver => ProfileField::DriverCompleted,
            Self::Destination => ProfileField::DestinationCompleted,
            Self::Route => ProfileField::RouteCompleted,
        }
    }
}
