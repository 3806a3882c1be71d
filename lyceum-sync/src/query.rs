//! Read-through queries with explicit freshness.

use crate::engine::SyncEngine;
use lyceum_cache::{Cacheable, Freshness, ScopedKey};
use lyceum_core::{AccessResult, LyceumResult};
use std::future::Future;
use tracing::debug;

/// What the UI renders for one cached query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<T> {
    /// The value to render, if any is known.
    pub value: Option<T>,
    /// True while a refetch is still needed to trust the value.
    pub is_loading: bool,
    /// True when the value shown is a stale last-good fallback.
    pub is_stale: bool,
}

impl<T> QueryResult<T> {
    /// A fresh, settled value.
    pub fn ready(value: T) -> Self {
        Self {
            value: Some(value),
            is_loading: false,
            is_stale: false,
        }
    }

    /// A stale last-good value served because the refetch failed.
    pub fn stale(value: T) -> Self {
        Self {
            value: Some(value),
            is_loading: false,
            is_stale: true,
        }
    }

    /// Confirmed absent server-side.
    pub fn absent() -> Self {
        Self {
            value: None,
            is_loading: false,
            is_stale: false,
        }
    }
}

impl SyncEngine {
    /// Synchronous cache peek for render-before-fetch.
    ///
    /// Never touches the network: reports the cached value (possibly
    /// stale) plus whether a refetch is still needed. A UI typically
    /// renders from this immediately and then awaits
    /// [`read_through`](Self::read_through).
    pub fn peek<T: Cacheable>(&self, key: &ScopedKey) -> LyceumResult<QueryResult<T>> {
        Ok(match self.store().get::<T>(key)? {
            Some(read) => {
                let stale = read.is_stale();
                QueryResult {
                    value: Some(read.into_value()),
                    is_loading: stale,
                    is_stale: stale,
                }
            }
            None => QueryResult {
                value: None,
                is_loading: true,
                is_stale: false,
            },
        })
    }

    /// Read through the cache with the given freshness contract.
    ///
    /// `BestEffort` serves a cached value within tolerance without a
    /// remote call; otherwise the fetcher runs and its result is cached.
    /// When the fetcher fails and a last-good value exists, the stale
    /// value is served instead of the error - the cache keeps the UI
    /// presentable, the error stays out of the render path.
    pub async fn read_through<T, F, Fut>(
        &self,
        key: ScopedKey,
        freshness: Freshness,
        fetch: F,
    ) -> LyceumResult<QueryResult<T>>
    where
        T: Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AccessResult<Option<T>>>,
    {
        if let Freshness::BestEffort { max_staleness } = freshness {
            if let Some(read) = self.store().get::<T>(&key)? {
                if !read.is_stale() && read.staleness() <= max_staleness {
                    return Ok(QueryResult::ready(read.into_value()));
                }
            }
        }

        match fetch().await {
            Ok(Some(value)) => {
                self.store().set(&key, &value)?;
                Ok(QueryResult::ready(value))
            }
            Ok(None) => {
                // Confirmed missing: drop any cached "exists" view.
                self.store().remove(&key)?;
                Ok(QueryResult::absent())
            }
            Err(error) => match self.store().get::<T>(&key)? {
                Some(read) => {
                    debug!(%error, "refetch failed, serving last-good value");
                    Ok(QueryResult::stale(read.into_value()))
                }
                None => Err(error.into()),
            },
        }
    }
}
