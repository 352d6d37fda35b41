//! Aggregate store contract

use async_trait::async_trait;
use pathfinder_profile::{
    PatchError, Profile, ProfilePatch, Report, ReportDraft, ReportId, Revision, Role, RoleId,
    UserId,
};

/// Guard evaluated atomically with a merge-patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePrecondition {
    /// Unconditional (last writer wins on the touched fields)
    Any,

    /// Only if the stored profile is still at this revision
    Revision(Revision),
}

impl WritePrecondition {
    /// Check against the stored revision
    ///
    /// # Errors
    /// [`StoreError::RevisionConflict`] if the revisions differ
    pub fn check(self, actual: Revision) -> Result<(), StoreError> {
        match self {
            Self::Any => Ok(()),
            Self::Revision(expected) if expected == actual => Ok(()),
            Self::Revision(expected) => Err(StoreError::RevisionConflict { expected, actual }),
        }
    }
}

/// Store failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No profile for this user
    #[error("profile not found: {0}")]
    NotFound(UserId),

    /// No report with this id
    #[error("report not found: {0}")]
    ReportNotFound(ReportId),

    /// Conditional write lost a race
    #[error("revision conflict: expected {expected}, found {actual}")]
    RevisionConflict {
        /// Revision the writer read
        expected: Revision,
        /// Revision currently stored
        actual: Revision,
    },

    /// Patch violates profile invariants
    #[error("invalid patch: {0}")]
    InvalidPatch(#[from] PatchError),

    /// Filesystem failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend unreachable or refused the operation
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Lost an optimistic-concurrency race
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::RevisionConflict { .. })
    }

    /// Missing profile
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Durable document store for profiles, reports and roles
///
/// # Contract
/// - `merge_patch` is field-level: fields absent from the patch are never
///   overwritten.
/// - The precondition check and the write are atomic with respect to other
///   writers of the same store.
/// - Every accepted `merge_patch` advances the profile revision by one.
#[async_trait]
pub trait AggregateStore: Send + Sync + std::fmt::Debug {
    /// Read a profile
    async fn get(&self, user: &UserId) -> Result<Profile, StoreError>;

    /// Create an empty profile, or return the existing one
    async fn create_profile(&self, user: &UserId) -> Result<Profile, StoreError>;

    /// Apply a field-level patch; returns the new revision
    async fn merge_patch(
        &self,
        user: &UserId,
        patch: &ProfilePatch,
        precondition: WritePrecondition,
    ) -> Result<Revision, StoreError>;

    /// Persist a new immutable report record
    async fn create_report(&self, draft: ReportDraft) -> Result<ReportId, StoreError>;

    /// Read a report record
    async fn get_report(&self, id: ReportId) -> Result<Report, StoreError>;

    /// Create or replace roles keyed by id (absent id creates)
    ///
    /// Returns the id of each role, in input order.
    async fn upsert_roles(&self, user: &UserId, roles: Vec<Role>)
        -> Result<Vec<RoleId>, StoreError>;

    /// All roles of a user, in creation order
    async fn list_roles(&self, user: &UserId) -> Result<Vec<Role>, StoreError>;
}

/// Upsert `roles` into an ordered collection; returns ids in input order
pub(crate) fn upsert_role_list(existing: &mut Vec<Role>, roles: Vec<Role>) -> Vec<RoleId> {
    let mut ids = Vec::with_capacity(roles.len());
    for mut role in roles {
        let id = *role.id.get_or_insert_with(RoleId::new);
        match existing.iter_mut().find(|r| r.id == Some(id)) {
            Some(slot) => *slot = role,
            None => existing.push(role),
        }
        ids.push(id);
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_check() {
        assert!(WritePrecondition::Any.check(Revision(3)).is_ok());
        assert!(WritePrecondition::Revision(Revision(3))
            .check(Revision(3))
            .is_ok());

        let err = WritePrecondition::Revision(Revision(2))
            .check(Revision(3))
            .unwrap_err();
        assert!(err.is_conflict());
        assert!(err.to_string().contains("expected r2, found r3"));
    }

    #[test]
    fn upsert_replaces_by_id_and_appends_new() {
        let mut roles = Vec::new();
        let ids = upsert_role_list(
            &mut roles,
            vec![Role::new("Engineer", "Acme", "2y", 6), Role::new("Lead", "Acme", "1y", 8)],
        );
        assert_eq!(roles.len(), 2);

        let mut edited = roles[0].clone();
        edited.heart_explosions_level = 9;
        let again = upsert_role_list(&mut roles, vec![edited, Role::new("CTO", "Beta", "3y", 10)]);

        assert_eq!(again[0], ids[0]);
        assert_eq!(roles.len(), 3);
        assert_eq!(roles[0].heart_explosions_level, 9);
        assert_eq!(roles[2].role_title, "CTO");
    }
}
