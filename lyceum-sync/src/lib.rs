//! Optimistic mutation engine with exact-snapshot rollback.
//!
//! This crate keeps the cache presentable while a write is in flight. A
//! mutation snapshots every cache entry it is about to touch, applies a
//! locally computed guess at the post-mutation state, awaits exactly one
//! remote accessor call, and then settles: reconcile the authoritative
//! value on success, or restore the snapshots byte-exact on failure.
//!
//! # Contract
//!
//! Per mutation, strictly in order:
//!
//! 1. Resolve the session identity; a signed-out mutation fails before any
//!    cache write.
//! 2. Snapshot the affected keys into a [`MutationContext`].
//! 3. Apply the optimistic values. The computation must mirror the
//!    server's eventual logic exactly; divergence here is a correctness
//!    bug, not a performance one.
//! 4. Await the accessor call - the only suspension point.
//! 5. On success, overwrite with the authoritative row where the accessor
//!    returns one.
//! 6. On failure, restore every snapshot and re-return the error.
//! 7. Either way, invalidate aggregate keys that are not worth keeping
//!    optimistic.
//!
//! # Overlapping mutations
//!
//! Two in-flight mutations on one key are not serialized. Each rollback
//! restores the snapshot it personally captured, which means a
//! later-completing success can overwrite an earlier rollback. That race
//! is accepted and documented rather than resolved; the cache is a
//! disposable view and the next refetch converges it.

pub mod client;
pub mod context;
pub mod engine;
pub mod mutation;
pub mod ops;
pub mod query;

pub use client::Client;
pub use context::MutationContext;
pub use engine::SyncEngine;
pub use mutation::OptimisticMutation;
pub use query::QueryResult;
