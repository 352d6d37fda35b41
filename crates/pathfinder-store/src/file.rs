//! Durable store: one JSON document per record on the local filesystem
//!
//! Layout under the root directory:
//!
//! ```text
//! profiles/<user>.json
//! reports/<report-id>.json
//! roles/<user>.json
//! ```
//!
//! Writes go to a sibling temp file and are renamed into place. A single
//! async mutex serializes read-modify-write cycles within the process.

use crate::store::{upsert_role_list, AggregateStore, StoreError, WritePrecondition};
use async_trait::async_trait;
use chrono::Utc;
use pathfinder_profile::{
    Profile, ProfilePatch, Report, ReportDraft, ReportId, Revision, Role, RoleId, UserId,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const PROFILES_DIR: &str = "profiles";
const REPORTS_DIR: &str = "reports";
const ROLES_DIR: &str = "roles";

/// Filesystem-backed [`AggregateStore`]
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (creating directories as needed) a store rooted at `root`
    ///
    /// # Errors
    /// [`StoreError::Io`] if the directories cannot be created
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        for dir in [PROFILES_DIR, REPORTS_DIR, ROLES_DIR] {
            tokio::fs::create_dir_all(root.join(dir)).await?;
        }
        tracing::debug!("Opened file store at {}", root.display());
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn profile_path(&self, user: &UserId) -> PathBuf {
        self.root
            .join(PROFILES_DIR)
            .join(format!("{}.json", file_stem(user)))
    }

    fn report_path(&self, id: ReportId) -> PathBuf {
        self.root.join(REPORTS_DIR).join(format!("{id}.json"))
    }

    fn roles_path(&self, user: &UserId) -> PathBuf {
        self.root
            .join(ROLES_DIR)
            .join(format!("{}.json", file_stem(user)))
    }
}

/// Filesystem-safe encoding of a user id
///
/// ASCII alphanumerics, `-` and `_` pass through; every other byte becomes
/// `%XX`, so distinct ids never share a file.
fn file_stem(user: &UserId) -> String {
    let mut out = String::with_capacity(user.as_str().len());
    for byte in user.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl AggregateStore for JsonFileStore {
    async fn get(&self, user: &UserId) -> Result<Profile, StoreError> {
        read_json(&self.profile_path(user))
            .await?
            .ok_or_else(|| StoreError::NotFound(user.clone()))
    }

    async fn create_profile(&self, user: &UserId) -> Result<Profile, StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.profile_path(user);

        if let Some(existing) = read_json::<Profile>(&path).await? {
            return Ok(existing);
        }

        let profile = Profile::new(user.clone());
        write_json(&path, &profile).await?;
        tracing::info!("Created profile for {}", user);
        Ok(profile)
    }

    async fn merge_patch(
        &self,
        user: &UserId,
        patch: &ProfilePatch,
        precondition: WritePrecondition,
    ) -> Result<Revision, StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.profile_path(user);

        let mut profile: Profile = read_json(&path)
            .await?
            .ok_or_else(|| StoreError::NotFound(user.clone()))?;

        precondition.check(profile.revision)?;
        let touched = profile.apply_patch(patch)?;
        profile.revision = profile.revision.next();
        write_json(&path, &profile).await?;

        tracing::debug!(
            "Merged {} field(s) into {} at {}",
            touched.len(),
            user,
            profile.revision
        );
        Ok(profile.revision)
    }

    async fn create_report(&self, draft: ReportDraft) -> Result<ReportId, StoreError> {
        let id = ReportId::new();
        let report = Report::from_draft(id, draft, Utc::now());
        write_json(&self.report_path(id), &report).await?;
        Ok(id)
    }

    async fn get_report(&self, id: ReportId) -> Result<Report, StoreError> {
        read_json(&self.report_path(id))
            .await?
            .ok_or(StoreError::ReportNotFound(id))
    }

    async fn upsert_roles(
        &self,
        user: &UserId,
        roles: Vec<Role>,
    ) -> Result<Vec<RoleId>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.roles_path(user);

        let mut stored: Vec<Role> = read_json(&path).await?.unwrap_or_default();
        let ids = upsert_role_list(&mut stored, roles);
        write_json(&path, &stored).await?;
        Ok(ids)
    }

    async fn list_roles(&self, user: &UserId) -> Result<Vec<Role>, StoreError> {
        Ok(read_json(&self.roles_path(user)).await?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathfinder_profile::{GeneratedField, ListField, Typology};
    use pretty_assertions::assert_eq;

    fn user() -> UserId {
        UserId::new("alice@example.com").unwrap()
    }

    #[test]
    fn file_stem_escapes_unsafe_bytes() {
        assert_eq!(file_stem(&UserId::new("a-b_c9").unwrap()), "a-b_c9");
        assert_eq!(file_stem(&UserId::new("../x").unwrap()), "%2E%2E%2Fx");
        assert_eq!(file_stem(&user()), "alice%40example%2Ecom");
    }

    #[tokio::test]
    async fn profile_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = JsonFileStore::open(dir.path()).await.unwrap();
            store.create_profile(&user()).await.unwrap();
            store
                .merge_patch(
                    &user(),
                    &ProfilePatch::new()
                        .with_typology(Typology::new("4", "4w5", "sx", "sx/sp", "451"))
                        .with_list(ListField::Passions, vec!["music".into()]),
                    WritePrecondition::Any,
                )
                .await
                .unwrap();
        }

        let reopened = JsonFileStore::open(dir.path()).await.unwrap();
        let profile = reopened.get(&user()).await.unwrap();
        assert!(profile.typology.is_complete());
        assert_eq!(profile.passions, vec!["music".to_string()]);
        assert_eq!(profile.revision, Revision(1));
    }

    #[tokio::test]
    async fn conflicting_write_leaves_document_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        store.create_profile(&user()).await.unwrap();
        let r1 = store
            .merge_patch(
                &user(),
                &ProfilePatch::new().with_generated(GeneratedField::RoutePlan, "v1"),
                WritePrecondition::Any,
            )
            .await
            .unwrap();

        let err = store
            .merge_patch(
                &user(),
                &ProfilePatch::new().with_generated(GeneratedField::RoutePlan, "v2"),
                WritePrecondition::Revision(Revision::INITIAL),
            )
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        let profile = store.get(&user()).await.unwrap();
        assert_eq!(profile.route_plan.as_deref(), Some("v1"));
        assert_eq!(profile.revision, r1);
    }

    #[tokio::test]
    async fn reports_and_roles_are_separate_documents() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        let id = store
            .create_report(ReportDraft {
                user_id: user(),
                report: "narrative".into(),
                typology: Typology::new("4", "4w5", "sx", "sx/sp", "451"),
            })
            .await
            .unwrap();
        assert!(store.report_path(id).exists());
        assert_eq!(store.get_report(id).await.unwrap().report, "narrative");

        store
            .upsert_roles(&user(), vec![Role::new("Engineer", "Acme", "2y", 7)])
            .await
            .unwrap();
        assert_eq!(store.list_roles(&user()).await.unwrap().len(), 1);
        assert!(store
            .list_roles(&UserId::new("nobody").unwrap())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        let err = store
            .merge_patch(&user(), &ProfilePatch::new(), WritePrecondition::Any)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
