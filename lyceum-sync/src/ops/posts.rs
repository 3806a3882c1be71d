//! Community post writes.

use crate::mutation::OptimisticMutation;
use async_trait::async_trait;
use chrono::Utc;
use lyceum_cache::{CacheStore, ScopedKey};
use lyceum_core::{new_entity_id, AccessResult, Post, PostId, ResourceKind, StoreError};
use lyceum_remote::{Identity, RemoteService};

fn feed_key(viewer: &Identity) -> ScopedKey {
    ScopedKey::aggregate(viewer.user_id, ResourceKind::PostList)
}

fn post_key(viewer: &Identity, post_id: PostId) -> ScopedKey {
    ScopedKey::new(viewer.user_id, ResourceKind::Post, post_id)
}

/// Publish a new community post authored by the viewer.
#[derive(Debug, Clone)]
pub struct CreatePost {
    title: String,
    body: String,
    speculative_id: PostId,
}

impl CreatePost {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            speculative_id: new_entity_id(),
        }
    }
}

#[async_trait]
impl OptimisticMutation for CreatePost {
    type Output = Post;

    fn name(&self) -> &'static str {
        "post.create"
    }

    fn affected_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![feed_key(viewer)]
    }

    fn apply_optimistic(&self, store: &CacheStore, viewer: &Identity) -> Result<(), StoreError> {
        // Prepend into the cached feed only; a never-fetched feed is
        // left for the first real fetch to populate.
        let key = feed_key(viewer);
        if let Some(read) = store.get::<Vec<Post>>(&key)? {
            let mut posts = read.into_value();
            posts.insert(
                0,
                Post {
                    post_id: self.speculative_id,
                    author_id: viewer.user_id,
                    author_name: viewer.display_name.clone(),
                    title: self.title.clone(),
                    body: self.body.clone(),
                    comment_count: 0,
                    created_at: Utc::now(),
                },
            );
            store.set(&key, &posts)?;
        }
        Ok(())
    }

    async fn execute(
        &self,
        remote: &dyn RemoteService,
        viewer: &Identity,
    ) -> AccessResult<Self::Output> {
        remote
            .post_insert(viewer, self.title.clone(), self.body.clone())
            .await
    }

    fn reconcile(
        &self,
        store: &CacheStore,
        viewer: &Identity,
        output: &Self::Output,
    ) -> Result<(), StoreError> {
        let key = feed_key(viewer);
        if let Some(read) = store.get::<Vec<Post>>(&key)? {
            let mut posts = read.into_value();
            for post in posts.iter_mut() {
                if post.post_id == self.speculative_id {
                    *post = output.clone();
                }
            }
            store.set(&key, &posts)?;
        }
        // Cache the authoritative row under its own key as well.
        store.set(&post_key(viewer, output.post_id), output)
    }

    fn aggregate_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![feed_key(viewer)]
    }
}
