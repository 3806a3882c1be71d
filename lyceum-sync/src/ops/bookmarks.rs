//! Bookmark toggling.

use crate::mutation::OptimisticMutation;
use async_trait::async_trait;
use chrono::Utc;
use lyceum_cache::{CacheStore, ScopedKey};
use lyceum_core::{
    AccessResult, BookmarkBatch, BookmarkStatus, LectureId, ResourceKind, StoreError,
};
use lyceum_remote::{Identity, RemoteService};

/// Flip the viewer's bookmark on one lecture.
///
/// Touches the single-status key and, when cached, the viewer's batch map
/// entry for the same lecture - both must show the same flag at settle.
#[derive(Debug, Clone)]
pub struct ToggleBookmark {
    lecture_id: LectureId,
}

impl ToggleBookmark {
    pub fn new(lecture_id: LectureId) -> Self {
        Self { lecture_id }
    }

    fn status_key(&self, viewer: &Identity) -> ScopedKey {
        ScopedKey::new(viewer.user_id, ResourceKind::BookmarkStatus, self.lecture_id)
    }

    fn batch_key(&self, viewer: &Identity) -> ScopedKey {
        ScopedKey::aggregate(viewer.user_id, ResourceKind::BookmarkBatch)
    }

    /// Write the given flag to the batch map entry, when the batch is cached.
    fn patch_batch(
        &self,
        store: &CacheStore,
        viewer: &Identity,
        bookmarked: bool,
    ) -> Result<(), StoreError> {
        let key = self.batch_key(viewer);
        if let Some(read) = store.get::<BookmarkBatch>(&key)? {
            let mut batch = read.into_value();
            batch.bookmarked.insert(self.lecture_id, bookmarked);
            store.set(&key, &batch)?;
        }
        Ok(())
    }
}

#[async_trait]
impl OptimisticMutation for ToggleBookmark {
    type Output = BookmarkStatus;

    fn name(&self) -> &'static str {
        "bookmark.toggle"
    }

    fn affected_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![self.status_key(viewer), self.batch_key(viewer)]
    }

    fn apply_optimistic(&self, store: &CacheStore, viewer: &Identity) -> Result<(), StoreError> {
        let key = self.status_key(viewer);
        // A never-fetched status flips from the unbookmarked default.
        let status = match store.get::<BookmarkStatus>(&key)? {
            Some(read) => {
                let mut status = read.into_value();
                status.bookmarked = !status.bookmarked;
                status.updated_at = Utc::now();
                status
            }
            None => BookmarkStatus {
                lecture_id: self.lecture_id,
                user_id: viewer.user_id,
                bookmarked: true,
                updated_at: Utc::now(),
            },
        };
        let bookmarked = status.bookmarked;
        store.set(&key, &status)?;
        self.patch_batch(store, viewer, bookmarked)
    }

    async fn execute(
        &self,
        remote: &dyn RemoteService,
        viewer: &Identity,
    ) -> AccessResult<Self::Output> {
        remote.bookmark_toggle(viewer, self.lecture_id).await
    }

    fn reconcile(
        &self,
        store: &CacheStore,
        viewer: &Identity,
        output: &Self::Output,
    ) -> Result<(), StoreError> {
        store.set(&self.status_key(viewer), output)?;
        self.patch_batch(store, viewer, output.bookmarked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyceum_core::new_entity_id;
    use std::time::Duration;

    fn setup() -> (CacheStore, Identity, ToggleBookmark) {
        let store = CacheStore::new(Duration::from_secs(60));
        let viewer = Identity::new(new_entity_id(), "민호");
        let toggle = ToggleBookmark::new(new_entity_id());
        (store, viewer, toggle)
    }

    #[test]
    fn test_apply_without_prior_entry_bookmarks() {
        let (store, viewer, toggle) = setup();

        toggle
            .apply_optimistic(&store, &viewer)
            .expect("apply should succeed");

        let read = store
            .get::<BookmarkStatus>(&toggle.status_key(&viewer))
            .expect("get should succeed")
            .expect("status should be cached");
        assert!(read.value().bookmarked);
    }

    #[test]
    fn test_apply_flips_existing_entry() {
        let (store, viewer, toggle) = setup();
        store
            .set(
                &toggle.status_key(&viewer),
                &BookmarkStatus {
                    lecture_id: toggle.lecture_id,
                    user_id: viewer.user_id,
                    bookmarked: true,
                    updated_at: Utc::now(),
                },
            )
            .expect("set should succeed");

        toggle
            .apply_optimistic(&store, &viewer)
            .expect("apply should succeed");

        let read = store
            .get::<BookmarkStatus>(&toggle.status_key(&viewer))
            .expect("get should succeed")
            .expect("status should be cached");
        assert!(!read.value().bookmarked);
    }

    #[test]
    fn test_apply_patches_cached_batch() {
        let (store, viewer, toggle) = setup();
        store
            .set(&toggle.batch_key(&viewer), &BookmarkBatch::default())
            .expect("set should succeed");

        toggle
            .apply_optimistic(&store, &viewer)
            .expect("apply should succeed");

        let batch = store
            .get::<BookmarkBatch>(&toggle.batch_key(&viewer))
            .expect("get should succeed")
            .expect("batch should be cached")
            .into_value();
        assert_eq!(batch.bookmarked.get(&toggle.lecture_id), Some(&true));
    }

    #[test]
    fn test_apply_skips_absent_batch() {
        let (store, viewer, toggle) = setup();

        toggle
            .apply_optimistic(&store, &viewer)
            .expect("apply should succeed");

        assert!(store
            .get::<BookmarkBatch>(&toggle.batch_key(&viewer))
            .expect("get should succeed")
            .is_none());
    }
}
