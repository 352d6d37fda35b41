//! Direct user edits to the profile
//!
//! Everything the user types in rather than generates: typology codes,
//! core values, list items, planning inputs, quiz answers, roles and
//! completion flags. Writes go through the same merge-patch path as the
//! pipeline; list and slot edits use the revision-checked retry loop.

use crate::archetype::format_archetype;
use crate::error::{EditError, InputError};
use crate::occ::{read_modify_write, OccError};
use crate::quiz;
use crate::steps::validate_hours;
use pathfinder_merge::append_unique;
use pathfinder_merge::SlotError;
use pathfinder_profile::{
    GeneratedField, ListField, Milestone, PlanningPatch, Profile, ProfileField, ProfilePatch,
    Revision, Role, RoleId, Typology, UserId,
};
use pathfinder_store::{AggregateStore, WritePrecondition};
use std::convert::Infallible;
use std::sync::Arc;

/// Applies user edits to stored profiles
#[derive(Debug, Clone)]
pub struct ProfileEditor {
    store: Arc<dyn AggregateStore>,
    max_merge_attempts: usize,
}

impl ProfileEditor {
    /// Editor over `store`, retrying conflicting list/slot writes up to
    /// `max_merge_attempts` times
    #[must_use]
    pub fn new(store: Arc<dyn AggregateStore>, max_merge_attempts: usize) -> Self {
        Self {
            store,
            max_merge_attempts,
        }
    }

    /// Current profile, creating an empty one on first use
    ///
    /// # Errors
    /// [`EditError::Store`]
    pub async fn ensure_profile(&self, user: &UserId) -> Result<Profile, EditError> {
        Ok(self.store.create_profile(user).await?)
    }

    /// Set typology codes; fields absent in `typology` are kept
    ///
    /// # Errors
    /// [`EditError::Store`]
    pub async fn set_typology(
        &self,
        user: &UserId,
        typology: Typology,
    ) -> Result<Revision, EditError> {
        let patch = ProfilePatch::new().with_typology(typology);
        self.write(user, &patch).await
    }

    /// Put `value` into core-value slot `index`
    ///
    /// # Errors
    /// [`EditError::Slot`] if the value is blank, the index is out of range
    /// or another slot already holds the value
    pub async fn assign_core_value(
        &self,
        user: &UserId,
        index: usize,
        value: &str,
    ) -> Result<Revision, EditError> {
        let value = value.trim();
        let result = read_modify_write(
            self.store.as_ref(),
            user,
            self.max_merge_attempts,
            None,
            "core_values",
            |profile| -> Result<_, SlotError> {
                let next = profile.core_values.assign(index, value)?;
                if next == profile.core_values {
                    return Ok(None);
                }
                Ok(Some(ProfilePatch::new().with_core_values(next)))
            },
        )
        .await;
        from_occ(result)
    }

    /// Append items to a list, skipping blanks and values already present
    ///
    /// # Errors
    /// [`EditError::Store`] or [`EditError::ConflictRetriesExhausted`]
    pub async fn add_list_items(
        &self,
        user: &UserId,
        field: ListField,
        items: Vec<String>,
    ) -> Result<Revision, EditError> {
        let items: Vec<String> = items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();

        let result = read_modify_write(
            self.store.as_ref(),
            user,
            self.max_merge_attempts,
            None,
            "list",
            |profile| -> Result<_, Infallible> {
                let existing = profile.list(field);
                let merged = append_unique(existing, items.iter().cloned());
                if merged.len() == existing.len() {
                    return Ok(None);
                }
                Ok(Some(ProfilePatch::new().with_list(field, merged)))
            },
        )
        .await;

        match result {
            Ok(revision) => Ok(revision),
            Err(OccError::Rejected(never)) => match never {},
            Err(OccError::Store(err)) => Err(err.into()),
            Err(OccError::Exhausted { attempts, .. }) => {
                Err(EditError::ConflictRetriesExhausted { attempts })
            }
        }
    }

    /// Set the route planner inputs
    ///
    /// # Errors
    /// [`EditError::Input`] for non-positive hours or blank text
    pub async fn set_planning_inputs(
        &self,
        user: &UserId,
        available_hours: f64,
        commitments: &str,
        timeline: &str,
    ) -> Result<Revision, EditError> {
        let available_hours = validate_hours(available_hours)?;
        let commitments = non_blank(commitments, ProfileField::Commitments)?;
        let timeline = non_blank(timeline, ProfileField::Timeline)?;

        let patch = ProfilePatch::new().with_planning(PlanningPatch {
            available_hours: Some(available_hours),
            commitments: Some(commitments),
            timeline: Some(timeline),
        });
        self.write(user, &patch).await
    }

    /// Score quiz answers and store the percentage
    ///
    /// # Errors
    /// [`EditError::Input`] if the answers are malformed
    pub async fn record_quiz(&self, user: &UserId, ratings: &[u8]) -> Result<u8, EditError> {
        let score = quiz::score_slice(ratings)?;
        let patch = ProfilePatch::new().with_role_clarity_score(score);
        self.write(user, &patch).await?;
        tracing::info!("Recorded role clarity score {} for {}", score, user);
        Ok(score)
    }

    /// Replace the purpose text
    ///
    /// # Errors
    /// [`EditError::Input`] if blank
    pub async fn set_purpose_profile(
        &self,
        user: &UserId,
        text: &str,
    ) -> Result<Revision, EditError> {
        let text = non_blank(text, ProfileField::PurposeProfile)?;
        let patch = ProfilePatch::new().with_generated(GeneratedField::PurposeProfile, text);
        self.write(user, &patch).await
    }

    /// Set a completion flag (flags are never cleared)
    ///
    /// # Errors
    /// [`EditError::Store`]
    pub async fn mark_completed(
        &self,
        user: &UserId,
        milestone: Milestone,
    ) -> Result<Revision, EditError> {
        let patch = ProfilePatch::new().with_completed(milestone);
        self.write(user, &patch).await
    }

    /// Validate and upsert role history entries
    ///
    /// # Errors
    /// [`EditError::Role`] naming the first invalid entry; nothing is written
    pub async fn upsert_roles(
        &self,
        user: &UserId,
        roles: Vec<Role>,
    ) -> Result<Vec<RoleId>, EditError> {
        for (index, role) in roles.iter().enumerate() {
            role.validate()
                .map_err(|source| EditError::Role { index, source })?;
        }
        Ok(self.store.upsert_roles(user, roles).await?)
    }

    /// Archetype display code of a stored profile
    ///
    /// # Errors
    /// [`EditError::Store`] if the profile cannot be read
    pub async fn archetype_code(&self, user: &UserId) -> Result<Option<String>, EditError> {
        let profile = self.store.get(user).await?;
        Ok(format_archetype(&profile.typology))
    }

    async fn write(&self, user: &UserId, patch: &ProfilePatch) -> Result<Revision, EditError> {
        let revision = self
            .store
            .merge_patch(user, patch, WritePrecondition::Any)
            .await?;
        tracing::debug!("Edited {:?} for {} at {}", patch.fields(), user, revision);
        Ok(revision)
    }
}

fn non_blank(value: &str, field: ProfileField) -> Result<String, InputError> {
    let value = value.trim();
    if value.is_empty() {
        Err(InputError::Blank(field))
    } else {
        Ok(value.to_string())
    }
}

fn from_occ<E: Into<EditError>>(
    result: Result<Revision, OccError<E>>,
) -> Result<Revision, EditError> {
    match result {
        Ok(revision) => Ok(revision),
        Err(OccError::Rejected(err)) => Err(err.into()),
        Err(OccError::Store(err)) => Err(err.into()),
        Err(OccError::Exhausted { attempts, .. }) => {
            Err(EditError::ConflictRetriesExhausted { attempts })
        }
    }
}
