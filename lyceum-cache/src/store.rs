//! The synchronous in-memory cache store.
//!
//! Reads and writes never suspend; the only suspension point of the data
//! layer is the remote accessor call. The store is shared behind an `Arc`
//! and locked with `std::sync::RwLock` - a poisoned lock surfaces as
//! [`StoreError::LockPoisoned`] instead of panicking through.

use crate::entry::{CachedRead, StoredEntry};
use crate::key::ScopedKey;
use crate::traits::Cacheable;
use lyceum_core::{ResourceKind, StoreError, UserId};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of typed read hits.
    pub hits: u64,
    /// Number of typed read misses.
    pub misses: u64,
    /// Number of entries currently stored.
    pub entries: u64,
    /// Number of invalidation marks applied.
    pub invalidations: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// In-memory keyed store holding the last known server-derived view for
/// each query.
///
/// Invalidation marks entries stale but keeps the value, so the last-good
/// view stays displayable until a refetch completes. Data leaves the store
/// only through [`remove`](Self::remove), which exists for rolling back a
/// speculative first write.
#[derive(Debug)]
pub struct CacheStore {
    entries: RwLock<HashMap<ScopedKey, StoredEntry>>,
    stats: RwLock<CacheStats>,
    stale_after: Duration,
}

impl CacheStore {
    /// Create a store with the given age-based staleness threshold.
    pub fn new(stale_after: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: RwLock::new(CacheStats::default()),
            stale_after,
        }
    }

    /// The configured age threshold beyond which entries read as stale.
    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    /// Get a typed value from the cache.
    ///
    /// Absent is a valid result meaning "never fetched or removed". A
    /// present entry reads as stale when it was explicitly invalidated or
    /// is older than the configured threshold.
    pub fn get<T: Cacheable>(&self, key: &ScopedKey) -> Result<Option<CachedRead<T>>, StoreError> {
        debug_assert_eq!(key.kind(), T::kind(), "typed read addressed to wrong key kind");

        let snapshot = {
            let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
            entries.get(key).map(|entry| {
                let stale = entry.stale || entry.age() > self.stale_after;
                (entry.value.clone(), entry.cached_at, stale)
            })
        };

        let mut stats = self.stats.write().map_err(|_| StoreError::LockPoisoned)?;
        match snapshot {
            Some((value, cached_at, stale)) => {
                let value: T = serde_json::from_value(value).map_err(StoreError::codec)?;
                stats.hits += 1;
                Ok(Some(CachedRead::new(value, cached_at, stale)))
            }
            None => {
                stats.misses += 1;
                Ok(None)
            }
        }
    }

    /// Put a typed value into the cache, overwriting unconditionally.
    ///
    /// The entry is marked fresh as of now.
    pub fn set<T: Cacheable>(&self, key: &ScopedKey, value: &T) -> Result<(), StoreError> {
        debug_assert_eq!(key.kind(), T::kind(), "typed write addressed to wrong key kind");

        let json = serde_json::to_value(value).map_err(StoreError::codec)?;
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        entries.insert(key.clone(), StoredEntry::fresh(json));
        Ok(())
    }

    /// Get the raw stored entry for a key.
    ///
    /// This is the snapshot primitive used by the mutation context: the
    /// returned entry is byte-exact, including its timestamp and stale
    /// flag.
    pub fn raw(&self, key: &ScopedKey) -> Result<Option<StoredEntry>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    /// Put a raw entry back, preserving its timestamp and stale flag.
    ///
    /// Used by rollback and by the realtime feed when a change payload
    /// carries the new row.
    pub fn set_raw(&self, key: &ScopedKey, entry: StoredEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        entries.insert(key.clone(), entry);
        Ok(())
    }

    /// Remove an entry outright, returning what was stored.
    ///
    /// The only caller besides tests is rollback of a speculative first
    /// write, where restoring "absent" is the correct snapshot.
    pub fn remove(&self, key: &ScopedKey) -> Result<Option<StoredEntry>, StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.remove(key))
    }

    /// Mark one entry stale, keeping its value displayable.
    ///
    /// Returns true when an entry existed to mark.
    pub fn invalidate(&self, key: &ScopedKey) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        let Some(entry) = entries.get_mut(key) else {
            return Ok(false);
        };
        entry.stale = true;
        drop(entries);

        let mut stats = self.stats.write().map_err(|_| StoreError::LockPoisoned)?;
        stats.invalidations += 1;
        Ok(true)
    }

    /// Mark every entry of one kind for one viewer stale.
    pub fn invalidate_kind(&self, user_id: UserId, kind: ResourceKind) -> Result<u64, StoreError> {
        self.invalidate_where(|key| key.matches_kind(user_id, kind))
    }

    /// Mark every entry matching the predicate stale.
    pub fn invalidate_where<F>(&self, predicate: F) -> Result<u64, StoreError>
    where
        F: Fn(&ScopedKey) -> bool,
    {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        let mut marked = 0u64;
        for (key, entry) in entries.iter_mut() {
            if predicate(key) {
                entry.stale = true;
                marked += 1;
            }
        }
        drop(entries);

        let mut stats = self.stats.write().map_err(|_| StoreError::LockPoisoned)?;
        stats.invalidations += marked;
        Ok(marked)
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> Result<usize, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.len())
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Current usage statistics.
    pub fn stats(&self) -> Result<CacheStats, StoreError> {
        let mut stats = self
            .stats
            .read()
            .map_err(|_| StoreError::LockPoisoned)?
            .clone();
        stats.entries = self.len()? as u64;
        Ok(stats)
    }
}
