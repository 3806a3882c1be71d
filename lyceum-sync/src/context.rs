//! Per-mutation snapshot bundle used for rollback.

use lyceum_cache::{CacheStore, ScopedKey, StoredEntry};
use lyceum_core::StoreError;

/// Snapshots of every cache entry one in-flight mutation touched.
///
/// Created at mutation start, consumed at settle. Restoring puts back
/// exactly what was captured - including restoring "absent" by removing a
/// speculative entry - rather than recomputing an undo, so concurrent
/// mutations cannot compound each other's errors through it.
#[derive(Debug)]
pub struct MutationContext {
    snapshots: Vec<(ScopedKey, Option<StoredEntry>)>,
}

impl MutationContext {
    /// Capture the current entry (or absence) for each key.
    ///
    /// Duplicate keys are snapshotted once; the first occurrence wins.
    pub fn capture(store: &CacheStore, keys: &[ScopedKey]) -> Result<Self, StoreError> {
        let mut snapshots: Vec<(ScopedKey, Option<StoredEntry>)> = Vec::with_capacity(keys.len());
        for key in keys {
            if snapshots.iter().any(|(seen, _)| seen == key) {
                continue;
            }
            snapshots.push((key.clone(), store.raw(key)?));
        }
        Ok(Self { snapshots })
    }

    /// Put every captured snapshot back.
    ///
    /// Keys that were absent at capture time are removed outright, so a
    /// failed first-ever interaction leaves no half-populated entry
    /// behind.
    pub fn restore(&self, store: &CacheStore) -> Result<(), StoreError> {
        for (key, snapshot) in &self.snapshots {
            match snapshot {
                Some(entry) => store.set_raw(key, entry.clone())?,
                None => {
                    store.remove(key)?;
                }
            }
        }
        Ok(())
    }

    /// The keys this context covers.
    pub fn keys(&self) -> impl Iterator<Item = &ScopedKey> {
        self.snapshots.iter().map(|(key, _)| key)
    }

    /// Number of snapshotted keys.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True when no keys were captured.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyceum_core::{new_entity_id, ResourceKind, UnreadCount};
    use std::time::Duration;

    fn store() -> CacheStore {
        CacheStore::new(Duration::from_secs(60))
    }

    #[test]
    fn test_restore_present_snapshot() {
        let store = store();
        let key = ScopedKey::aggregate(new_entity_id(), ResourceKind::UnreadCount);
        store
            .set(&key, &UnreadCount { count: 3 })
            .expect("set should succeed");

        let context =
            MutationContext::capture(&store, &[key.clone()]).expect("capture should succeed");
        store
            .set(&key, &UnreadCount { count: 99 })
            .expect("set should succeed");

        context.restore(&store).expect("restore should succeed");

        let read = store
            .get::<UnreadCount>(&key)
            .expect("get should succeed")
            .expect("entry should exist");
        assert_eq!(read.value().count, 3);
    }

    #[test]
    fn test_restore_absent_snapshot_removes_entry() {
        let store = store();
        let key = ScopedKey::aggregate(new_entity_id(), ResourceKind::UnreadCount);

        let context =
            MutationContext::capture(&store, &[key.clone()]).expect("capture should succeed");
        store
            .set(&key, &UnreadCount { count: 1 })
            .expect("set should succeed");

        context.restore(&store).expect("restore should succeed");

        assert!(store
            .get::<UnreadCount>(&key)
            .expect("get should succeed")
            .is_none());
    }

    #[test]
    fn test_capture_dedupes_keys() {
        let store = store();
        let key = ScopedKey::aggregate(new_entity_id(), ResourceKind::UnreadCount);

        let context = MutationContext::capture(&store, &[key.clone(), key.clone()])
            .expect("capture should succeed");
        assert_eq!(context.len(), 1);
    }

    #[test]
    fn test_restore_preserves_stale_flag() {
        let store = store();
        let key = ScopedKey::aggregate(new_entity_id(), ResourceKind::UnreadCount);
        store
            .set(&key, &UnreadCount { count: 2 })
            .expect("set should succeed");
        store.invalidate(&key).expect("invalidate should succeed");

        let before = store
            .raw(&key)
            .expect("raw should succeed")
            .expect("entry should exist");
        let context =
            MutationContext::capture(&store, &[key.clone()]).expect("capture should succeed");

        store
            .set(&key, &UnreadCount { count: 5 })
            .expect("set should succeed");
        context.restore(&store).expect("restore should succeed");

        let after = store
            .raw(&key)
            .expect("raw should succeed")
            .expect("entry should exist");
        assert_eq!(before, after);
    }
}
