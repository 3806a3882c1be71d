//! Stored entries and freshness contracts for cache reads.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;

/// Freshness requirement for read-through queries.
///
/// Callers must state their staleness tolerance explicitly rather than
/// relying on a hidden "best effort" default.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Accept a cached value up to the specified age, provided it has not
    /// been explicitly invalidated. Older or invalidated entries trigger a
    /// refetch.
    BestEffort {
        /// Maximum acceptable staleness for cached data.
        max_staleness: Duration,
    },

    /// Always refetch from the remote, using the cache only as the
    /// fallback value when the refetch fails.
    #[default]
    Latest,
}

impl Freshness {
    /// Create a BestEffort freshness with the given max staleness.
    pub fn best_effort(max_staleness: Duration) -> Self {
        Self::BestEffort { max_staleness }
    }

    /// Returns true if this is a BestEffort freshness.
    pub fn is_best_effort(&self) -> bool {
        matches!(self, Self::BestEffort { .. })
    }
}

/// The raw stored form of one cache entry.
///
/// Values are kept as JSON so the store stays heterogeneous across entity
/// types; typed access goes through [`Cacheable`](crate::Cacheable)
/// serialization at the store boundary. Owned exclusively by the store;
/// handed out only to the mutation context for snapshot-exact rollback.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    /// The last known server-derived value.
    pub value: Value,
    /// When this value was cached (or optimistically written).
    pub cached_at: DateTime<Utc>,
    /// Whether the entry was explicitly invalidated.
    pub stale: bool,
}

impl StoredEntry {
    /// Create a fresh entry as of now.
    pub fn fresh(value: Value) -> Self {
        Self {
            value,
            cached_at: Utc::now(),
            stale: false,
        }
    }

    /// Age of this entry relative to now.
    pub fn age(&self) -> Duration {
        let now = Utc::now();
        if now > self.cached_at {
            (now - self.cached_at).to_std().unwrap_or(Duration::ZERO)
        } else {
            Duration::ZERO
        }
    }
}

/// Result of a typed cache read, carrying staleness metadata.
///
/// The wrapper ensures callers see how old the data is and whether it has
/// been invalidated before deciding to render or refetch.
#[derive(Debug, Clone)]
pub struct CachedRead<T> {
    value: T,
    cached_at: DateTime<Utc>,
    stale: bool,
}

impl<T> CachedRead<T> {
    /// Create a read from a decoded store entry.
    pub fn new(value: T, cached_at: DateTime<Utc>, stale: bool) -> Self {
        Self {
            value,
            cached_at,
            stale,
        }
    }

    /// Consume the wrapper and return the underlying value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Get a reference to the underlying value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// When this value was cached.
    pub fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }

    /// True when the entry was explicitly invalidated or aged out.
    ///
    /// A stale read is still displayable; it just should not be trusted
    /// without a refetch.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Duration since the value was cached.
    pub fn staleness(&self) -> Duration {
        let now = Utc::now();
        if now > self.cached_at {
            (now - self.cached_at).to_std().unwrap_or(Duration::ZERO)
        } else {
            Duration::ZERO
        }
    }

    /// Map the inner value to a new type.
    pub fn map<U, F>(self, f: F) -> CachedRead<U>
    where
        F: FnOnce(T) -> U,
    {
        CachedRead {
            value: f(self.value),
            cached_at: self.cached_at,
            stale: self.stale,
        }
    }
}

impl<T> AsRef<T> for CachedRead<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_freshness_best_effort() {
        let freshness = Freshness::best_effort(Duration::from_secs(60));
        assert!(freshness.is_best_effort());
    }

    #[test]
    fn test_freshness_default_is_latest() {
        assert_eq!(Freshness::default(), Freshness::Latest);
    }

    #[test]
    fn test_stored_entry_fresh() {
        let entry = StoredEntry::fresh(json!({"count": 3}));
        assert!(!entry.stale);
        assert!(entry.age() < Duration::from_secs(1));
    }

    #[test]
    fn test_cached_read_staleness() {
        let past = Utc::now() - chrono::Duration::seconds(5);
        let read = CachedRead::new("value", past, false);

        let staleness = read.staleness();
        assert!(staleness >= Duration::from_secs(4));
        assert!(staleness <= Duration::from_secs(10));
    }

    #[test]
    fn test_cached_read_map() {
        let read = CachedRead::new(42i32, Utc::now(), true);
        let mapped = read.map(|v| v.to_string());
        assert!(mapped.is_stale());
        assert_eq!(mapped.into_value(), "42");
    }
}
