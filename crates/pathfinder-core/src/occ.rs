//! Bounded read-modify-write against a revisioned profile

use pathfinder_profile::{Profile, ProfileField, ProfilePatch, Revision, UserId};
use pathfinder_store::{AggregateStore, StoreError, WritePrecondition};

/// Why a read-modify-write gave up
#[derive(Debug)]
pub(crate) enum OccError<E> {
    /// The builder refused the current profile
    Rejected(E),
    /// Non-conflict store failure
    Store(StoreError),
    /// Every attempt lost to a concurrent writer
    Exhausted {
        attempts: usize,
        last: StoreError,
    },
}

/// Read the profile, build a patch from it, and write it conditionally on
/// the revision that was read; on conflict re-read and rebuild.
///
/// `seed` is used instead of the first read when the caller already holds
/// a snapshot. A builder returning `Ok(None)` means there is nothing to
/// write; the current revision is returned without touching the store.
pub(crate) async fn read_modify_write<F, E>(
    store: &dyn AggregateStore,
    user: &UserId,
    max_attempts: usize,
    mut seed: Option<Profile>,
    label: &'static str,
    mut build: F,
) -> Result<Revision, OccError<E>>
where
    F: FnMut(&Profile) -> Result<Option<ProfilePatch>, E> + Send,
    E: Send,
{
    let attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let profile = match seed.take() {
            Some(profile) => profile,
            None => store.get(user).await.map_err(OccError::Store)?,
        };
        let Some(patch) = build(&profile).map_err(OccError::Rejected)? else {
            return Ok(profile.revision);
        };

        match store
            .merge_patch(user, &patch, WritePrecondition::Revision(profile.revision))
            .await
        {
            Ok(revision) => return Ok(revision),
            Err(err) if err.is_conflict() => {
                metrics::counter!("pathfinder_merge_conflicts_total", "op" => label).increment(1);
                if attempt >= attempts {
                    tracing::warn!(
                        "Giving up {} write for {} after {} conflicting attempts",
                        label,
                        user,
                        attempt
                    );
                    return Err(OccError::Exhausted {
                        attempts: attempt,
                        last: err,
                    });
                }
                tracing::warn!(
                    "Revision conflict on {} write for {} (attempt {}/{}), retrying",
                    label,
                    user,
                    attempt,
                    attempts
                );
            }
            Err(err) => return Err(OccError::Store(err)),
        }
    }
}

/// Write `field` the way its merge policy requires
///
/// Accumulating fields (lists, core-value slots) go through
/// [`read_modify_write`]. Replaced fields are built once from `seed` (or a
/// fresh read) and written last-writer-wins.
pub(crate) async fn write_with_policy<F, E>(
    store: &dyn AggregateStore,
    user: &UserId,
    field: ProfileField,
    max_attempts: usize,
    seed: Option<Profile>,
    label: &'static str,
    mut build: F,
) -> Result<Revision, OccError<E>>
where
    F: FnMut(&Profile) -> Result<Option<ProfilePatch>, E> + Send,
    E: Send,
{
    let policy = field.merge_policy();
    if policy.needs_revision_check() {
        return read_modify_write(store, user, max_attempts, seed, label, build).await;
    }

    let profile = match seed {
        Some(profile) => profile,
        None => store.get(user).await.map_err(OccError::Store)?,
    };
    let Some(patch) = build(&profile).map_err(OccError::Rejected)? else {
        return Ok(profile.revision);
    };
    tracing::debug!("Writing {} for {} under {}", field, user, policy);
    store
        .merge_patch(user, &patch, WritePrecondition::Any)
        .await
        .map_err(OccError::Store)
}
