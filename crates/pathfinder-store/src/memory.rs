//! In-process store backed by sharded concurrent maps

use crate::store::{upsert_role_list, AggregateStore, StoreError, WritePrecondition};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use pathfinder_profile::{
    Profile, ProfilePatch, Report, ReportDraft, ReportId, Revision, Role, RoleId, UserId,
};

/// In-memory [`AggregateStore`]
///
/// Each profile entry is guarded by its shard lock for the duration of a
/// merge-patch, so the revision check and the write are atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    profiles: DashMap<UserId, Profile>,
    reports: DashMap<ReportId, Report>,
    roles: DashMap<UserId, Vec<Role>>,
}

impl InMemoryStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile as-is (fixtures, imports)
    pub fn insert_profile(&self, profile: Profile) {
        self.profiles.insert(profile.user_id.clone(), profile);
    }

    /// Number of report records, including orphaned ones
    #[must_use]
    pub fn report_count(&self) -> usize {
        self.reports.len()
    }
}

#[async_trait]
impl AggregateStore for InMemoryStore {
    async fn get(&self, user: &UserId) -> Result<Profile, StoreError> {
        self.profiles
            .get(user)
            .map(|p| p.value().clone())
            .ok_or_else(|| StoreError::NotFound(user.clone()))
    }

    async fn create_profile(&self, user: &UserId) -> Result<Profile, StoreError> {
        let entry = self
            .profiles
            .entry(user.clone())
            .or_insert_with(|| Profile::new(user.clone()));
        Ok(entry.value().clone())
    }

    async fn merge_patch(
        &self,
        user: &UserId,
        patch: &ProfilePatch,
        precondition: WritePrecondition,
    ) -> Result<Revision, StoreError> {
        let mut entry = self
            .profiles
            .get_mut(user)
            .ok_or_else(|| StoreError::NotFound(user.clone()))?;

        precondition.check(entry.revision)?;
        let touched = entry.apply_patch(patch)?;
        entry.revision = entry.revision.next();

        tracing::debug!(
            "Merged {} field(s) into {} at {}",
            touched.len(),
            user,
            entry.revision
        );
        Ok(entry.revision)
    }

    async fn create_report(&self, draft: ReportDraft) -> Result<ReportId, StoreError> {
        let id = ReportId::new();
        self.reports
            .insert(id, Report::from_draft(id, draft, Utc::now()));
        Ok(id)
    }

    async fn get_report(&self, id: ReportId) -> Result<Report, StoreError> {
        self.reports
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or(StoreError::ReportNotFound(id))
    }

    async fn upsert_roles(
        &self,
        user: &UserId,
        roles: Vec<Role>,
    ) -> Result<Vec<RoleId>, StoreError> {
        let mut entry = self.roles.entry(user.clone()).or_default();
        Ok(upsert_role_list(&mut entry, roles))
    }

    async fn list_roles(&self, user: &UserId) -> Result<Vec<Role>, StoreError> {
        Ok(self
            .roles
            .get(user)
            .map(|r| r.value().clone())
            .unwrap_or_default())
    }
}
