use async_trait::async_trait;
use parking_lot::Mutex;
use pathfinder_profile::{
    Profile, ProfilePatch, Report, ReportDraft, ReportId, Revision, Role, RoleId, UserId,
};
use pathfinder_store::{AggregateStore, InMemoryStore, StoreError, WritePrecondition};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

/// [`InMemoryStore`] wrapper with scripted faults
///
/// - `fail_next_merges(n)`: the next `n` merge-patches fail as unavailable
/// - `fail_next_reports(n)`: the next `n` report creations fail
/// - `interleave(patch)`: just before the next revision-checked merge, the
///   patch is applied unconditionally, as if another writer got there first
#[derive(Debug, Default)]
pub struct FaultyStore {
    inner: InMemoryStore,
    merge_failures: AtomicUsize,
    report_failures: AtomicUsize,
    interleaved: Mutex<VecDeque<ProfilePatch>>,
    merge_calls: AtomicUsize,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, profile: Profile) -> Self {
        self.inner.insert_profile(profile);
        self
    }

    pub fn fail_next_merges(&self, n: usize) {
        self.merge_failures.store(n, Ordering::SeqCst);
    }

    pub fn fail_next_reports(&self, n: usize) {
        self.report_failures.store(n, Ordering::SeqCst);
    }

    pub fn interleave(&self, patch: ProfilePatch) {
        self.interleaved.lock().push_back(patch);
    }

    pub fn merge_calls(&self) -> usize {
        self.merge_calls.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl AggregateStore for FaultyStore {
    async fn get(&self, user: &UserId) -> Result<Profile, StoreError> {
        self.inner.get(user).await
    }

    async fn create_profile(&self, user: &UserId) -> Result<Profile, StoreError> {
        self.inner.create_profile(user).await
    }

    async fn merge_patch(
        &self,
        user: &UserId,
        patch: &ProfilePatch,
        precondition: WritePrecondition,
    ) -> Result<Revision, StoreError> {
        self.merge_calls.fetch_add(1, Ordering::SeqCst);
        if take_one(&self.merge_failures) {
            return Err(StoreError::Unavailable("injected merge failure".into()));
        }

        if matches!(precondition, WritePrecondition::Revision(_)) {
            let concurrent = self.interleaved.lock().pop_front();
            if let Some(concurrent) = concurrent {
                self.inner
                    .merge_patch(user, &concurrent, WritePrecondition::Any)
                    .await?;
            }
        }

        self.inner.merge_patch(user, patch, precondition).await
    }

    async fn create_report(&self, draft: ReportDraft) -> Result<ReportId, StoreError> {
        if take_one(&self.report_failures) {
            return Err(StoreError::Unavailable("injected report failure".into()));
        }
        self.inner.create_report(draft).await
    }

    async fn get_report(&self, id: ReportId) -> Result<Report, StoreError> {
        self.inner.get_report(id).await
    }

    async fn upsert_roles(
        &self,
        user: &UserId,
        roles: Vec<Role>,
    ) -> Result<Vec<RoleId>, StoreError> {
        self.inner.upsert_roles(user, roles).await
    }

    async fn list_roles(&self, user: &UserId) -> Result<Vec<Role>, StoreError> {
        self.inner.list_roles(user).await
    }
}
