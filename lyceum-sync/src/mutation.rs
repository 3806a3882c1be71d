//! The mutation strategy trait.

use async_trait::async_trait;
use lyceum_cache::{CacheStore, ScopedKey};
use lyceum_core::{AccessResult, StoreError};
use lyceum_remote::{Identity, RemoteService};

/// One optimistic write operation against the remote backend.
///
/// Implementations are small strategy objects: the engine owns the
/// sequencing (snapshot, apply, execute, settle), the strategy owns what
/// "optimistic" means for its entity. One implementation exists per
/// operation rather than per call site, which is what keeps the pattern
/// from being copy-pasted across every entity.
#[async_trait]
pub trait OptimisticMutation: Send + Sync {
    /// Value produced by the accessor call on success.
    type Output: Send + Sync;

    /// Operation name for logging, e.g. `"bookmark.toggle"`.
    fn name(&self) -> &'static str;

    /// Whether the engine must resolve a signed-in identity first.
    ///
    /// Defaults to true; every current operation writes viewer-owned data.
    fn requires_auth(&self) -> bool {
        true
    }

    /// Every cache key this mutation may write optimistically.
    ///
    /// The engine snapshots exactly these before
    /// [`apply_optimistic`](Self::apply_optimistic) runs; writing a key
    /// not listed here escapes rollback.
    fn affected_keys(&self, viewer: &Identity) -> Vec<ScopedKey>;

    /// Apply the locally computed post-mutation state to the cache.
    ///
    /// Must mirror the server's eventual logic exactly. For a key with no
    /// existing entry, compute from the zero-value default or skip -
    /// never write a partial record.
    fn apply_optimistic(&self, store: &CacheStore, viewer: &Identity) -> Result<(), StoreError>;

    /// Perform the remote call. Exactly one primary accessor call; any
    /// additional call must be a documented best-effort side call whose
    /// failure is swallowed with a warning.
    async fn execute(
        &self,
        remote: &dyn RemoteService,
        viewer: &Identity,
    ) -> AccessResult<Self::Output>;

    /// Overwrite optimistic guesses with the authoritative value.
    ///
    /// Default: keep the optimistic value and let aggregate invalidation
    /// converge the rest.
    fn reconcile(
        &self,
        store: &CacheStore,
        viewer: &Identity,
        output: &Self::Output,
    ) -> Result<(), StoreError> {
        let _ = (store, viewer, output);
        Ok(())
    }

    /// Broader keys (lists, counters) invalidated at settle regardless of
    /// outcome, forcing a lazy refetch on next read.
    fn aggregate_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        let _ = viewer;
        Vec::new()
    }
}
