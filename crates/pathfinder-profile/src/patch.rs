//! Closed, versioned merge-patch schema
//!
//! A [`ProfilePatch`] names exactly the field groups it touches. Applying it
//! is field-level: absent groups and absent fields inside a group leave the
//! stored value alone. Patches are validated as a whole before any field is
//! written, so a rejected patch leaves the profile untouched.

use crate::field::{GeneratedField, ListField, Milestone, ProfileField};
use crate::ids::ReportId;
use crate::profile::{CoreValues, Profile, Typology};
use pathfinder_merge::find_duplicate;
use serde::{Deserialize, Serialize};

/// Current patch schema version
pub const PATCH_SCHEMA_VERSION: u32 = 1;

/// Patch rejection
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatchError {
    /// Produced by an incompatible writer
    #[error("unsupported patch schema {found} (expected {expected})")]
    UnsupportedSchema {
        /// Version on the patch
        found: u32,
        /// Version this build understands
        expected: u32,
    },

    /// A list would contain the same entry twice
    #[error("duplicate entry '{value}' in {field}")]
    DuplicateListEntry {
        /// List field
        field: ProfileField,
        /// Repeated value
        value: String,
    },

    /// Two core-value slots hold the same value
    #[error("core value '{0}' selected twice")]
    DuplicateCoreValue(String),

    /// Scalar outside its domain
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Offending field
        field: ProfileField,
        /// Why it was rejected
        reason: String,
    },
}

/// Replacement values for accumulating lists
///
/// Each present list replaces the stored one; writers compute it with
/// `append_unique` against the revision they read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPatch {
    /// Career ideas list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub career_ideas: Option<Vec<String>>,
    /// Skills list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    /// Passions list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passions: Option<Vec<String>>,
    /// Interests list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
}

impl ListPatch {
    fn entries(&self) -> impl Iterator<Item = (ListField, &Vec<String>)> {
        [
            (ListField::CareerIdeas, &self.career_ideas),
            (ListField::Skills, &self.skills),
            (ListField::Passions, &self.passions),
            (ListField::Interests, &self.interests),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_ref().map(|v| (field, v)))
    }

    fn set(&mut self, field: ListField, items: Vec<String>) {
        let slot = match field {
            ListField::CareerIdeas => &mut self.career_ideas,
            ListField::Skills => &mut self.skills,
            ListField::Passions => &mut self.passions,
            ListField::Interests => &mut self.interests,
        };
        *slot = Some(items);
    }
}

/// Replacement values for generated text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTextPatch {
    /// Contribution text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution_profile: Option<String>,
    /// Calling text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calling_profile: Option<String>,
    /// Purpose text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose_profile: Option<String>,
    /// Route plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_plan: Option<String>,
}

impl GeneratedTextPatch {
    fn entries(&self) -> impl Iterator<Item = (GeneratedField, &String)> {
        [
            (GeneratedField::ContributionProfile, &self.contribution_profile),
            (GeneratedField::CallingProfile, &self.calling_profile),
            (GeneratedField::PurposeProfile, &self.purpose_profile),
            (GeneratedField::RoutePlan, &self.route_plan),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_ref().map(|v| (field, v)))
    }

    fn set(&mut self, field: GeneratedField, text: String) {
        let slot = match field {
            GeneratedField::ContributionProfile => &mut self.contribution_profile,
            GeneratedField::CallingProfile => &mut self.calling_profile,
            GeneratedField::PurposeProfile => &mut self.purpose_profile,
            GeneratedField::RoutePlan => &mut self.route_plan,
        };
        *slot = Some(text);
    }
}

/// Planning inputs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningPatch {
    /// Weekly hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_hours: Option<f64>,
    /// Existing commitments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commitments: Option<String>,
    /// Target timeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
}

/// Derived assessment values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentPatch {
    /// Quiz percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_clarity_score: Option<u8>,
}

/// Field-level update of a stored profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    /// Schema version; must equal [`PATCH_SCHEMA_VERSION`]
    pub schema_version: u32,
    /// Typology codes to set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typology: Option<Typology>,
    /// Full replacement of the core-value slots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_values: Option<CoreValues>,
    /// List replacements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lists: Option<ListPatch>,
    /// Generated text replacements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<GeneratedTextPatch>,
    /// Planning inputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning: Option<PlanningPatch>,
    /// Assessment results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<AssessmentPatch>,
    /// New live report pointer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportId>,
    /// Milestones to mark complete (never unmarks)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub completed: Vec<Milestone>,
}

impl Default for ProfilePatch {
    fn default() -> Self {
        Self {
            schema_version: PATCH_SCHEMA_VERSION,
            typology: None,
            core_values: None,
            lists: None,
            generated: None,
            planning: None,
            assessment: None,
            report: None,
            completed: Vec::new(),
        }
    }
}

impl ProfilePatch {
    /// Empty patch at the current schema version
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set typology fields
    #[must_use]
    pub fn with_typology(mut self, typology: Typology) -> Self {
        self.typology = Some(typology);
        self
    }

    /// Replace core-value slots
    #[must_use]
    pub fn with_core_values(mut self, values: CoreValues) -> Self {
        self.core_values = Some(values);
        self
    }

    /// Replace one list
    #[must_use]
    pub fn with_list(mut self, field: ListField, items: Vec<String>) -> Self {
        self.lists.get_or_insert_with(ListPatch::default).set(field, items);
        self
    }

    /// Replace one generated text
    #[must_use]
    pub fn with_generated(mut self, field: GeneratedField, text: impl Into<String>) -> Self {
        self.generated
            .get_or_insert_with(GeneratedTextPatch::default)
            .set(field, text.into());
        self
    }

    /// Set planning inputs
    #[must_use]
    pub fn with_planning(mut self, planning: PlanningPatch) -> Self {
        self.planning = Some(planning);
        self
    }

    /// Set role clarity score
    #[must_use]
    pub fn with_role_clarity_score(mut self, score: u8) -> Self {
        self.assessment = Some(AssessmentPatch {
            role_clarity_score: Some(score),
        });
        self
    }

    /// Repoint the live report
    #[must_use]
    pub fn with_report(mut self, id: ReportId) -> Self {
        self.report = Some(id);
        self
    }

    /// Mark a milestone complete
    #[must_use]
    pub fn with_completed(mut self, milestone: Milestone) -> Self {
        if !self.completed.contains(&milestone) {
            self.completed.push(milestone);
        }
        self
    }

    /// Fields this patch would write
    #[must_use]
    pub fn fields(&self) -> Vec<ProfileField> {
        let mut fields = Vec::new();
        if let Some(typology) = &self.typology {
            fields.extend(typology.present_fields());
        }
        if self.core_values.is_some() {
            fields.push(ProfileField::CoreValues);
        }
        if let Some(lists) = &self.lists {
            fields.extend(lists.entries().map(|(f, _)| f.field()));
        }
        if let Some(generated) = &self.generated {
            fields.extend(generated.entries().map(|(f, _)| f.field()));
        }
        if let Some(planning) = &self.planning {
            if planning.available_hours.is_some() {
                fields.push(ProfileField::AvailableHours);
            }
            if planning.commitments.is_some() {
                fields.push(ProfileField::Commitments);
            }
            if planning.timeline.is_some() {
                fields.push(ProfileField::Timeline);
            }
        }
        if self
            .assessment
            .as_ref()
            .is_some_and(|a| a.role_clarity_score.is_some())
        {
            fields.push(ProfileField::RoleClarityScore);
        }
        if self.report.is_some() {
            fields.push(ProfileField::LifePurposeReportId);
        }
        fields.extend(self.completed.iter().map(Milestone::field));
        fields
    }

    /// Patch writes nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Check the patch against the profile invariants
    ///
    /// # Errors
    /// [`PatchError`] describing the first violation found
    pub fn validate(&self) -> Result<(), PatchError> {
        if self.schema_version != PATCH_SCHEMA_VERSION {
            return Err(PatchError::UnsupportedSchema {
                found: self.schema_version,
                expected: PATCH_SCHEMA_VERSION,
            });
        }

        if let Some(values) = &self.core_values {
            if let Some(dup) = values.duplicate() {
                return Err(PatchError::DuplicateCoreValue(dup));
            }
        }

        if let Some(lists) = &self.lists {
            for (field, items) in lists.entries() {
                if let Some(dup) = find_duplicate(items) {
                    return Err(PatchError::DuplicateListEntry {
                        field: field.field(),
                        value: dup.to_string(),
                    });
                }
            }
        }

        if let Some(hours) = self.planning.as_ref().and_then(|p| p.available_hours) {
            if !hours.is_finite() || hours <= 0.0 {
                return Err(PatchError::InvalidValue {
                    field: ProfileField::AvailableHours,
                    reason: format!("{hours} is not a positive number of hours"),
                });
            }
        }

        if let Some(score) = self.assessment.as_ref().and_then(|a| a.role_clarity_score) {
            if score > 100 {
                return Err(PatchError::InvalidValue {
                    field: ProfileField::RoleClarityScore,
                    reason: format!("{score} is above 100"),
                });
            }
        }

        Ok(())
    }
}

impl Profile {
    /// Apply a merge-patch, touching only the fields it names
    ///
    /// Returns the fields written. The revision is left to the store.
    ///
    /// # Errors
    /// [`PatchError`] if the patch fails [`ProfilePatch::validate`]; the
    /// profile is unchanged in that case
    pub fn apply_patch(&mut self, patch: &ProfilePatch) -> Result<Vec<ProfileField>, PatchError> {
        patch.validate()?;

        if let Some(typology) = &patch.typology {
            self.typology.overlay(typology);
        }
        if let Some(values) = &patch.core_values {
            self.core_values = values.clone();
        }
        if let Some(lists) = &patch.lists {
            for (field, items) in lists.entries() {
                self.list_mut(field).clone_from(items);
            }
        }
        if let Some(generated) = &patch.generated {
            for (field, text) in generated.entries() {
                *self.generated_mut(field) = Some(text.clone());
            }
        }
        if let Some(planning) = &patch.planning {
            if planning.available_hours.is_some() {
                self.available_hours = planning.available_hours;
            }
            if planning.commitments.is_some() {
                self.commitments.clone_from(&planning.commitments);
            }
            if planning.timeline.is_some() {
                self.timeline.clone_from(&planning.timeline);
            }
        }
        if let Some(score) = patch.assessment.as_ref().and_then(|a| a.role_clarity_score) {
            self.role_clarity_score = Some(score);
        }
        if let Some(report) = patch.report {
            self.life_purpose_report_id = Some(report);
        }
        for milestone in &patch.completed {
            self.mark_completed(*milestone);
        }

        Ok(patch.fields())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::UserId;
    use pretty_assertions::assert_eq;

    fn profile() -> Profile {
        let mut p = Profile::new(UserId::new("u1").unwrap())
            .with_typology(Typology::new("4", "4w5", "sx", "sx/sp", "451"));
        p.skills = vec!["writing".into()];
        p.route_plan = Some("old plan".into());
        p
    }

    #[test]
    fn apply_touches_only_named_fields() {
        let mut p = profile();
        let before = p.clone();
        let touched = p
            .apply_patch(&ProfilePatch::new().with_generated(GeneratedField::RoutePlan, "new plan"))
            .unwrap();

        assert_eq!(touched, vec![ProfileField::RoutePlan]);
        assert_eq!(p.route_plan.as_deref(), Some("new plan"));
        assert_eq!(p.skills, before.skills);
        assert_eq!(p.typology, before.typology);
    }

    #[test]
    fn list_replacement_keeps_other_lists() {
        let mut p = profile();
        p.apply_patch(&ProfilePatch::new().with_list(
            ListField::CareerIdeas,
            vec!["A".into(), "B".into()],
        ))
        .unwrap();

        assert_eq!(p.career_ideas, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(p.skills, vec!["writing".to_string()]);
    }

    #[test]
    fn rejects_duplicate_list_entries_without_writing() {
        let mut p = profile();
        let before = p.clone();
        let err = p
            .apply_patch(
                &ProfilePatch::new()
                    .with_generated(GeneratedField::RoutePlan, "x")
                    .with_list(ListField::Skills, vec!["a".into(), "a".into()]),
            )
            .unwrap_err();

        assert_eq!(
            err,
            PatchError::DuplicateListEntry {
                field: ProfileField::Skills,
                value: "a".into()
            }
        );
        assert_eq!(p, before);
    }

    #[test]
    fn rejects_unknown_schema_version() {
        let mut patch = ProfilePatch::new();
        patch.schema_version = 2;
        assert!(matches!(
            patch.validate(),
            Err(PatchError::UnsupportedSchema { found: 2, .. })
        ));
    }

    #[test]
    fn rejects_non_positive_hours_and_large_scores() {
        let hours = ProfilePatch::new().with_planning(PlanningPatch {
            available_hours: Some(0.0),
            ..PlanningPatch::default()
        });
        assert!(hours.validate().is_err());

        let nan = ProfilePatch::new().with_planning(PlanningPatch {
            available_hours: Some(f64::NAN),
            ..PlanningPatch::default()
        });
        assert!(nan.validate().is_err());

        assert!(ProfilePatch::new()
            .with_role_clarity_score(101)
            .validate()
            .is_err());
    }

    #[test]
    fn completion_is_monotonic() {
        let mut p = profile();
        p.apply_patch(&ProfilePatch::new().with_completed(Milestone::Driver))
            .unwrap();
        p.apply_patch(&ProfilePatch::new()).unwrap();
        assert!(p.driver_completed);
        assert!(!p.route_completed);
    }

    #[test]
    fn rejects_repeated_core_values() {
        let patch = ProfilePatch::new().with_core_values(CoreValues::from_values(["a", "b", "a"]));
        assert_eq!(
            patch.validate(),
            Err(PatchError::DuplicateCoreValue("a".into()))
        );
    }

    #[test]
    fn patch_document_is_versioned() {
        let patch = ProfilePatch::new().with_report(ReportId::new());
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json["schemaVersion"], 1);
        assert!(json.get("lists").is_none());
        assert!(ProfilePatch::new().is_empty());
    }
}
