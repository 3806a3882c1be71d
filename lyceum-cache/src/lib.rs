//! Cache layer with explicit staleness and viewer-scoped keys.
//!
//! This crate holds the last known server-derived view for each query the
//! client has run, keyed by [`ScopedKey`]. It is the single shared mutable
//! resource of the data layer: mutations, refetches, and the realtime feed
//! all write through the same [`CacheStore`] API.
//!
//! # Design
//!
//! Staleness is explicit rather than hidden. Invalidation marks an entry
//! stale but keeps the last-good value, so the UI can keep rendering it
//! until a refetch lands instead of flickering to an empty state. Reads
//! return [`CachedRead<T>`], which carries the cached-at timestamp and the
//! stale flag so callers can decide whether to refetch.
//!
//! # Viewer isolation
//!
//! A [`ScopedKey`] cannot be constructed without a viewer id. Two signed-in
//! accounts on the same device can never read each other's cached rows -
//! this is enforced structurally, not by a runtime check.

pub mod entry;
pub mod feed;
pub mod key;
pub mod store;
pub mod traits;

pub use entry::{CachedRead, Freshness, StoredEntry};
pub use feed::{apply_change, pump, ChangeFeed, RowChange};
pub use key::ScopedKey;
pub use store::{CacheStats, CacheStore};
pub use traits::Cacheable;
