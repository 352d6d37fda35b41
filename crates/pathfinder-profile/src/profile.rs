//! The profile aggregate
//!
//! One [`Profile`] per user. It is built up incrementally by the wizard and
//! enriched by generated artifacts; all writes go through
//! [`ProfilePatch`](crate::ProfilePatch).

use crate::field::{GeneratedField, ListField, Milestone, ProfileField};
use crate::ids::{ReportId, Revision, UserId};
use pathfinder_merge::{assign_slot, find_duplicate, SlotError};
use serde::{Deserialize, Serialize};

/// Number of ranked core-value slots
pub const CORE_VALUE_SLOTS: usize = 5;

/// The five typological codes that form the archetype key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typology {
    /// Enneagram type digit, e.g. `4`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enneagram_type: Option<String>,
    /// Wing, e.g. `4w5`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wing: Option<String>,
    /// Subtype, e.g. `sx`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    /// Instinctual stacking, e.g. `sx/sp`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instinctual_stacking: Option<String>,
    /// Tritype, e.g. `451`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trifix: Option<String>,
}

impl Typology {
    /// Build a complete typology
    #[must_use]
    pub fn new(
        enneagram_type: impl Into<String>,
        wing: impl Into<String>,
        subtype: impl Into<String>,
        instinctual_stacking: impl Into<String>,
        trifix: impl Into<String>,
    ) -> Self {
        Self {
            enneagram_type: Some(enneagram_type.into()),
            wing: Some(wing.into()),
            subtype: Some(subtype.into()),
            instinctual_stacking: Some(instinctual_stacking.into()),
            trifix: Some(trifix.into()),
        }
    }

    /// Value of one typology field; `None` for non-typology fields
    #[must_use]
    pub fn get(&self, field: ProfileField) -> Option<&str> {
        let value = match field {
            ProfileField::EnneagramType => &self.enneagram_type,
            ProfileField::Wing => &self.wing,
            ProfileField::Subtype => &self.subtype,
            ProfileField::InstinctualStacking => &self.instinctual_stacking,
            ProfileField::Trifix => &self.trifix,
            _ => return None,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }

    /// Typology fields that are absent or blank
    #[must_use]
    pub fn missing(&self) -> Vec<ProfileField> {
        ProfileField::TYPOLOGY
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    /// All five codes present
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Overlay the fields set in `other`
    pub fn overlay(&mut self, other: &Typology) {
        let pairs = [
            (&mut self.enneagram_type, &other.enneagram_type),
            (&mut self.wing, &other.wing),
            (&mut self.subtype, &other.subtype),
            (&mut self.instinctual_stacking, &other.instinctual_stacking),
            (&mut self.trifix, &other.trifix),
        ];
        for (slot, incoming) in pairs {
            if incoming.is_some() {
                slot.clone_from(incoming);
            }
        }
    }

    /// Fields set in this (patch) value
    #[must_use]
    pub fn present_fields(&self) -> Vec<ProfileField> {
        ProfileField::TYPOLOGY
            .into_iter()
            .filter(|f| self.get(*f).is_some())
            .collect()
    }
}

/// Ranked selection of exactly five unique values once finalized
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoreValues(pub [Option<String>; CORE_VALUE_SLOTS]);

impl CoreValues {
    /// Slots from a list of values (extra values are ignored)
    #[must_use]
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut slots: [Option<String>; CORE_VALUE_SLOTS] = Default::default();
        for (slot, value) in slots.iter_mut().zip(values) {
            *slot = Some(value.into());
        }
        Self(slots)
    }

    /// Assign `value` to `index`, keeping values unique across slots
    ///
    /// # Errors
    /// See [`assign_slot`]
    pub fn assign(&self, index: usize, value: &str) -> Result<Self, SlotError> {
        assign_slot(&self.0, index, value).map(Self)
    }

    /// Filled slots in rank order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.iter().flatten().map(String::as_str)
    }

    /// All five slots filled
    #[inline]
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    /// No slot filled
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// First value held by two slots, if any
    #[must_use]
    pub fn duplicate(&self) -> Option<String> {
        let filled: Vec<String> = self.values().map(str::to_string).collect();
        find_duplicate(&filled).map(str::to_string)
    }
}

/// The central per-user aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Owner (immutable)
    pub user_id: UserId,
    /// Store write counter
    #[serde(default)]
    pub revision: Revision,

    /// Archetype codes
    #[serde(flatten)]
    pub typology: Typology,

    /// Ranked values
    #[serde(default)]
    pub core_values: CoreValues,

    /// Accumulated career ideas
    #[serde(default)]
    pub career_ideas: Vec<String>,
    /// Accumulated skills
    #[serde(default)]
    pub skills: Vec<String>,
    /// Accumulated passions
    #[serde(default)]
    pub passions: Vec<String>,
    /// Accumulated interests
    #[serde(default)]
    pub interests: Vec<String>,

    /// Synthesized contribution text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution_profile: Option<String>,
    /// Synthesized calling text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calling_profile: Option<String>,
    /// Purpose text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose_profile: Option<String>,
    /// Generated route plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_plan: Option<String>,

    /// Live report pointer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_purpose_report_id: Option<ReportId>,

    /// Weekly hours available for the plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_hours: Option<f64>,
    /// Existing commitments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commitments: Option<String>,
    /// Target timeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,

    /// Role clarity quiz result, 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_clarity_score: Option<u8>,

    /// Driver stage done
    #[serde(default)]
    pub driver_completed: bool,
    /// Destination stage done
    #[serde(default)]
    pub destination_completed: bool,
    /// Route stage done
    #[serde(default)]
    pub route_completed: bool,
}

impl Profile {
    /// Create an empty profile for a user
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            revision: Revision::INITIAL,
            typology: Typology::default(),
            core_values: CoreValues::default(),
            career_ideas: Vec::new(),
            skills: Vec::new(),
            passions: Vec::new(),
            interests: Vec::new(),
            contribution_profile: None,
            calling_profile: None,
            purpose_profile: None,
            route_plan: None,
            life_purpose_report_id: None,
            available_hours: None,
            commitments: None,
            timeline: None,
            role_clarity_score: None,
            driver_completed: false,
            destination_completed: false,
            route_completed: false,
        }
    }

    /// Builder: set typology
    #[must_use]
    pub fn with_typology(mut self, typology: Typology) -> Self {
        self.typology = typology;
        self
    }

    /// Builder: set planning inputs
    #[must_use]
    pub fn with_planning(
        mut self,
        available_hours: f64,
        commitments: impl Into<String>,
        timeline: impl Into<String>,
    ) -> Self {
        self.available_hours = Some(available_hours);
        self.commitments = Some(commitments.into());
        self.timeline = Some(timeline.into());
        self
    }

    /// Read an accumulating list
    #[must_use]
    pub fn list(&self, field: ListField) -> &[String] {
        match field {
            ListField::CareerIdeas => &self.career_ideas,
            ListField::Skills => &self.skills,
            ListField::Passions => &self.passions,
            ListField::Interests => &self.interests,
        }
    }

    pub(crate) fn list_mut(&mut self, field: ListField) -> &mut Vec<String> {
        match field {
            ListField::CareerIdeas => &mut self.career_ideas,
            ListField::Skills => &mut self.skills,
            ListField::Passions => &mut self.passions,
            ListField::Interests => &mut self.interests,
        }
    }

    /// Read a generated text field
    #[must_use]
    pub fn generated(&self, field: GeneratedField) -> Option<&str> {
        match field {
            GeneratedField::ContributionProfile => self.contribution_profile.as_deref(),
            GeneratedField::CallingProfile => self.calling_profile.as_deref(),
            GeneratedField::PurposeProfile => self.purpose_profile.as_deref(),
            GeneratedField::RoutePlan => self.route_plan.as_deref(),
        }
    }

    pub(crate) fn generated_mut(&mut self, field: GeneratedField) -> &mut Option<String> {
        match field {
            GeneratedField::ContributionProfile => &mut self.contribution_profile,
            GeneratedField::CallingProfile => &mut self.calling_profile,
            GeneratedField::PurposeProfile => &mut self.purpose_profile,
            GeneratedField::RoutePlan => &mut self.route_plan,
        }
    }

    /// Completion flag of a milestone
    #[must_use]
    pub fn is_completed(&self, milestone: Milestone) -> bool {
        match milestone {
            Milestone::Driver => self.driver_completed,
            Milestone::Destination => self.destination_completed,
            Milestone::Route => self.route_completed,
        }
    }

    pub(crate) fn mark_completed(&mut self, milestone: Milestone) {
        match milestone {
            Milestone::Driver => self.driver_completed = true,
            Milestone::Destination => self.destination_completed = true,
            Milestone::Route => self.route_completed = true,
        }
    }

    /// Whether a field holds a usable (non-blank) value
    #[must_use]
    pub fn is_present(&self, field: ProfileField) -> bool {
        fn filled(value: Option<&String>) -> bool {
            value.is_some_and(|v| !v.trim().is_empty())
        }

        match field {
            ProfileField::EnneagramType
            | ProfileField::Wing
            | ProfileField::Subtype
            | ProfileField::InstinctualStacking
            | ProfileField::Trifix => self.typology.get(field).is_some(),
            ProfileField::CoreValues => !self.core_values.is_empty(),
            ProfileField::CareerIdeas => !self.career_ideas.is_empty(),
            ProfileField::Skills => !self.skills.is_empty(),
            ProfileField::Passions => !self.passions.is_empty(),
            ProfileField::Interests => !self.interests.is_empty(),
            ProfileField::ContributionProfile => filled(self.contribution_profile.as_ref()),
            ProfileField::CallingProfile => filled(self.calling_profile.as_ref()),
            ProfileField::PurposeProfile => filled(self.purpose_profile.as_ref()),
            ProfileField::RoutePlan => filled(self.route_plan.as_ref()),
            ProfileField::LifePurposeReportId => self.life_purpose_report_id.is_some(),
            ProfileField::AvailableHours => self.available_hours.is_some(),
            ProfileField::Commitments => filled(self.commitments.as_ref()),
            ProfileField::Timeline => filled(self.timeline.as_ref()),
            ProfileField::RoleClarityScore => self.role_clarity_score.is_some(),
            ProfileField::DriverCompleted => self.driver_completed,
            ProfileField::DestinationCompleted => self.destination_completed,
            ProfileField::RouteCompleted => self.route_completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    #[test]
    fn typology_reports_missing_fields_in_order() {
        let mut t = Typology::new("4", "4w5", "sx", "sx/sp", "451");
        assert!(t.is_complete());

        t.trifix = None;
        t.wing = Some("  ".into());
        assert_eq!(t.missing(), vec![ProfileField::Wing, ProfileField::Trifix]);
    }

    #[test]
    fn typology_overlay_only_touches_present_fields() {
        let mut base = Typology::new("4", "4w5", "sx", "sx/sp", "451");
        let patch = Typology {
            wing: Some("4w3".into()),
            ..Typology::default()
        };
        base.overlay(&patch);
        assert_eq!(base.wing.as_deref(), Some("4w3"));
        assert_eq!(base.trifix.as_deref(), Some("451"));
    }

    #[test]
    fn core_values_assign_and_detect_duplicates() {
        let values = CoreValues::from_values(["a", "b"]);
        let values = values.assign(2, "c").unwrap();
        assert_eq!(values.values().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert!(values.assign(3, "a").is_err());
        assert!(!values.is_finalized());

        let broken = CoreValues([
            Some("x".into()),
            None,
            Some("x".into()),
            None,
            None,
        ]);
        assert_eq!(broken.duplicate().as_deref(), Some("x"));
    }

    #[test]
    fn profile_document_uses_camel_case_wire_names() {
        let profile = Profile::new(user())
            .with_typology(Typology::new("4", "4w5", "sx", "sx/sp", "451"))
            .with_planning(10.0, "job", "3 months");
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["enneagramType"], "4");
        assert_eq!(json["instinctualStacking"], "sx/sp");
        assert_eq!(json["availableHours"], 10.0);
        assert_eq!(json["driverCompleted"], false);
        assert!(json.get("routePlan").is_none());

        let back: Profile = serde_json::from_value(json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn is_present_treats_blank_text_as_missing() {
        let mut profile = Profile::new(user());
        profile.commitments = Some("   ".into());
        assert!(!profile.is_present(ProfileField::Commitments));
        profile.commitments = Some("job".into());
        assert!(profile.is_present(ProfileField::Commitments));
    }
}
