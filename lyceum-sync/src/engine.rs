//! The mutation engine.

use crate::context::MutationContext;
use crate::mutation::OptimisticMutation;
use lyceum_cache::CacheStore;
use lyceum_core::{AccessError, LyceumResult, SyncConfig};
use lyceum_remote::{require_identity, Identity, RemoteService, SessionProvider};
use std::sync::Arc;
use tracing::{debug, warn};

/// Executes mutations against the remote while keeping the cache store
/// visually consistent during network latency.
///
/// The engine is cheap to clone-by-Arc and is shared by every per-entity
/// client handle. It owns no entity logic; that lives in the
/// [`OptimisticMutation`] strategies under [`ops`](crate::ops).
pub struct SyncEngine {
    store: Arc<CacheStore>,
    remote: Arc<dyn RemoteService>,
    session: Arc<dyn SessionProvider>,
    config: SyncConfig,
}

impl SyncEngine {
    /// Create an engine over an existing store.
    pub fn new(
        store: Arc<CacheStore>,
        remote: Arc<dyn RemoteService>,
        session: Arc<dyn SessionProvider>,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            remote,
            session,
            config,
        }
    }

    /// Create an engine with a fresh store sized from the config.
    pub fn with_fresh_store(
        remote: Arc<dyn RemoteService>,
        session: Arc<dyn SessionProvider>,
        config: SyncConfig,
    ) -> Self {
        let store = Arc::new(CacheStore::new(config.stale_after));
        Self::new(store, remote, session, config)
    }

    /// The shared cache store.
    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    /// The remote accessor surface.
    pub fn remote(&self) -> &Arc<dyn RemoteService> {
        &self.remote
    }

    /// The engine configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Resolve the current viewer, falling back to the anonymous identity.
    ///
    /// Used by public reads; authenticated mutations go through
    /// [`require_viewer`](Self::require_viewer) instead.
    pub fn viewer_or_anonymous(&self) -> Identity {
        self.session
            .current_identity()
            .unwrap_or_else(Identity::anonymous)
    }

    /// Resolve the current viewer or fail with `AuthenticationRequired`.
    pub fn require_viewer(&self) -> LyceumResult<Identity> {
        Ok(require_identity(self.session.as_ref())?)
    }

    /// Run one mutation to settle.
    ///
    /// Executes the full contract: auth short-circuit, snapshot,
    /// optimistic apply, one awaited accessor call, reconcile-or-rollback,
    /// aggregate invalidation. The returned error (if any) is the accessor
    /// failure unchanged, for the UI boundary to render.
    pub async fn run<M: OptimisticMutation>(&self, mutation: M) -> LyceumResult<M::Output> {
        // Fail fast before any cache write when signed out.
        let viewer = if mutation.requires_auth() {
            self.require_viewer()?
        } else {
            self.viewer_or_anonymous()
        };

        let keys = mutation.affected_keys(&viewer);
        let context = MutationContext::capture(&self.store, &keys)?;
        debug!(
            op = mutation.name(),
            keys = context.len(),
            "mutation start"
        );

        mutation.apply_optimistic(&self.store, &viewer)?;

        // The only suspension point: everything before and after is
        // synchronous against the store.
        let outcome = mutation.execute(self.remote.as_ref(), &viewer).await;

        match outcome {
            Ok(output) => {
                mutation.reconcile(&self.store, &viewer, &output)?;
                for key in mutation.aggregate_keys(&viewer) {
                    self.store.invalidate(&key)?;
                }
                debug!(op = mutation.name(), "mutation settled");
                Ok(output)
            }
            Err(error) => {
                warn!(op = mutation.name(), %error, "mutation failed, rolling back");
                context.restore(&self.store)?;
                if matches!(error, AccessError::NotFound { .. }) {
                    // The target is gone server-side; a restored "exists"
                    // view must not be trusted past the next read.
                    for key in context.keys() {
                        self.store.invalidate(key)?;
                    }
                }
                for key in mutation.aggregate_keys(&viewer) {
                    self.store.invalidate(&key)?;
                }
                Err(error.into())
            }
        }
    }
}

impl Clone for SyncEngine {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            remote: Arc::clone(&self.remote),
            session: Arc::clone(&self.session),
            config: self.config.clone(),
        }
    }
}
