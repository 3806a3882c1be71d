//! Realtime change reconciliation.
//!
//! The hosted backend pushes row-change events for tables the client
//! subscribes to. This module routes those pushes into the same store API
//! the mutation engine uses, so the cache has exactly one writer surface
//! regardless of what triggered the write.
//!
//! A change carrying the new row is applied directly as a fresh entry; a
//! change without a payload marks the key stale so the next read refetches.

use crate::entry::StoredEntry;
use crate::key::ScopedKey;
use crate::store::CacheStore;
use lyceum_core::{FeedError, StoreError};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tracing::debug;

/// One external row-change event, already mapped to a cache key.
#[derive(Debug, Clone, PartialEq)]
pub struct RowChange {
    /// The cache entry the change affects.
    pub key: ScopedKey,
    /// The new row when the push carried it; `None` means "changed, refetch".
    pub payload: Option<Value>,
}

impl RowChange {
    /// A change that carries the new row.
    pub fn upsert(key: ScopedKey, payload: Value) -> Self {
        Self {
            key,
            payload: Some(payload),
        }
    }

    /// A change that only signals "this key is no longer current".
    pub fn touched(key: ScopedKey) -> Self {
        Self { key, payload: None }
    }
}

/// Publisher handle for the realtime feed.
///
/// Cloneable; the subscription adapter owns one per table subscription.
/// Publishing is synchronous and never blocks the caller.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: mpsc::Sender<RowChange>,
}

impl ChangeFeed {
    /// Create a feed with the given buffer capacity.
    ///
    /// Returns the publisher handle and the receiver to hand to
    /// [`pump`].
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<RowChange>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }

    /// Publish one change.
    ///
    /// Fails with [`FeedError::Saturated`] when the consumer has fallen
    /// behind by more than the buffer capacity, and [`FeedError::Closed`]
    /// when the consumer is gone.
    pub fn publish(&self, change: RowChange) -> Result<(), FeedError> {
        self.tx.try_send(change).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => FeedError::Saturated,
            mpsc::error::TrySendError::Closed(_) => FeedError::Closed,
        })
    }
}

/// Apply one change to the store.
///
/// Payload-carrying changes overwrite the entry as fresh; payload-less
/// changes mark the key stale (keeping the last-good value displayable).
pub fn apply_change(store: &CacheStore, change: &RowChange) -> Result<(), StoreError> {
    match &change.payload {
        Some(payload) => {
            debug!(key = ?change.key, "feed upsert");
            store.set_raw(&change.key, StoredEntry::fresh(payload.clone()))
        }
        None => {
            debug!(key = ?change.key, "feed invalidate");
            store.invalidate(&change.key).map(|_| ())
        }
    }
}

/// Drive the feed until the publisher side closes.
///
/// Spawn this on the runtime next to the engine; it is the single consumer
/// of the channel created by [`ChangeFeed::channel`].
pub async fn pump(
    store: Arc<CacheStore>,
    rx: mpsc::Receiver<RowChange>,
) -> Result<(), StoreError> {
    let mut changes = ReceiverStream::new(rx);
    while let Some(change) = changes.next().await {
        apply_change(&store, &change)?;
    }
    debug!("change feed drained");
    Ok(())
}
