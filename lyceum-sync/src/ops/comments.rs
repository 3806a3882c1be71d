//! Comment writes: add, edit, delete.

use crate::mutation::OptimisticMutation;
use async_trait::async_trait;
use chrono::Utc;
use lyceum_cache::{CacheStore, ScopedKey};
use lyceum_core::{
    new_entity_id, AccessResult, Comment, CommentId, Post, PostId, ResourceKind, StoreError,
};
use lyceum_remote::{Identity, RemoteService};
use tracing::warn;

fn list_key(viewer: &Identity, post_id: PostId) -> ScopedKey {
    ScopedKey::new(viewer.user_id, ResourceKind::CommentList, post_id)
}

fn post_key(viewer: &Identity, post_id: PostId) -> ScopedKey {
    ScopedKey::new(viewer.user_id, ResourceKind::Post, post_id)
}

fn feed_key(viewer: &Identity) -> ScopedKey {
    ScopedKey::aggregate(viewer.user_id, ResourceKind::PostList)
}

/// Bump a cached post's comment counter by `delta`, flooring at zero.
fn patch_comment_count(
    store: &CacheStore,
    viewer: &Identity,
    post_id: PostId,
    delta: i64,
) -> Result<(), StoreError> {
    let key = post_key(viewer, post_id);
    if let Some(read) = store.get::<Post>(&key)? {
        let mut post = read.into_value();
        post.comment_count = (post.comment_count + delta).max(0);
        store.set(&key, &post)?;
    }
    Ok(())
}

/// Append a comment authored by the viewer.
///
/// The optimistic row carries a speculative id generated at construction;
/// reconcile swaps it for the authoritative row.
#[derive(Debug, Clone)]
pub struct AddComment {
    post_id: PostId,
    body: String,
    speculative_id: CommentId,
}

impl AddComment {
    pub fn new(post_id: PostId, body: impl Into<String>) -> Self {
        Self {
            post_id,
            body: body.into(),
            speculative_id: new_entity_id(),
        }
    }
}

#[async_trait]
impl OptimisticMutation for AddComment {
    type Output = Comment;

    fn name(&self) -> &'static str {
        "comment.add"
    }

    fn affected_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![list_key(viewer, self.post_id), post_key(viewer, self.post_id)]
    }

    fn apply_optimistic(&self, store: &CacheStore, viewer: &Identity) -> Result<(), StoreError> {
        let key = list_key(viewer, self.post_id);
        let mut comments = store
            .get::<Vec<Comment>>(&key)?
            .map(|read| read.into_value())
            .unwrap_or_default();
        comments.push(Comment {
            comment_id: self.speculative_id,
            post_id: self.post_id,
            author_id: viewer.user_id,
            author_name: viewer.display_name.clone(),
            body: self.body.clone(),
            created_at: Utc::now(),
            edited_at: None,
        });
        store.set(&key, &comments)?;
        patch_comment_count(store, viewer, self.post_id, 1)
    }

    async fn execute(
        &self,
        remote: &dyn RemoteService,
        viewer: &Identity,
    ) -> AccessResult<Self::Output> {
        let comment = remote
            .comment_insert(viewer, self.post_id, self.body.clone())
            .await?;
        // Non-critical: the denormalized counter catches up on the next
        // refetch even if this fails.
        if let Err(error) = remote.post_refresh_comment_count(self.post_id).await {
            warn!(%error, "comment count refresh failed");
        }
        Ok(comment)
    }

    fn reconcile(
        &self,
        store: &CacheStore,
        viewer: &Identity,
        output: &Self::Output,
    ) -> Result<(), StoreError> {
        let key = list_key(viewer, self.post_id);
        if let Some(read) = store.get::<Vec<Comment>>(&key)? {
            let mut comments = read.into_value();
            for comment in comments.iter_mut() {
                if comment.comment_id == self.speculative_id {
                    *comment = output.clone();
                }
            }
            store.set(&key, &comments)?;
        }
        Ok(())
    }

    fn aggregate_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![post_key(viewer, self.post_id), feed_key(viewer)]
    }
}

/// Edit the body of the viewer's own comment.
#[derive(Debug, Clone)]
pub struct EditComment {
    comment_id: CommentId,
    post_id: PostId,
    body: String,
}

impl EditComment {
    pub fn new(comment_id: CommentId, post_id: PostId, body: impl Into<String>) -> Self {
        Self {
            comment_id,
            post_id,
            body: body.into(),
        }
    }
}

#[async_trait]
impl OptimisticMutation for EditComment {
    type Output = Comment;

    fn name(&self) -> &'static str {
        "comment.edit"
    }

    fn affected_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![list_key(viewer, self.post_id)]
    }

    fn apply_optimistic(&self, store: &CacheStore, viewer: &Identity) -> Result<(), StoreError> {
        let key = list_key(viewer, self.post_id);
        if let Some(read) = store.get::<Vec<Comment>>(&key)? {
            let mut comments = read.into_value();
            for comment in comments.iter_mut() {
                if comment.comment_id == self.comment_id {
                    comment.body = self.body.clone();
                    comment.edited_at = Some(Utc::now());
                }
            }
            store.set(&key, &comments)?;
        }
        Ok(())
    }

    async fn execute(
        &self,
        remote: &dyn RemoteService,
        viewer: &Identity,
    ) -> AccessResult<Self::Output> {
        remote
            .comment_update(viewer, self.comment_id, self.body.clone())
            .await
    }

    fn reconcile(
        &self,
        store: &CacheStore,
        viewer: &Identity,
        output: &Self::Output,
    ) -> Result<(), StoreError> {
        let key = list_key(viewer, self.post_id);
        if let Some(read) = store.get::<Vec<Comment>>(&key)? {
            let mut comments = read.into_value();
            for comment in comments.iter_mut() {
                if comment.comment_id == self.comment_id {
                    *comment = output.clone();
                }
            }
            store.set(&key, &comments)?;
        }
        Ok(())
    }
}

/// Delete the viewer's own comment.
#[derive(Debug, Clone)]
pub struct DeleteComment {
    comment_id: CommentId,
    post_id: PostId,
}

impl DeleteComment {
    pub fn new(comment_id: CommentId, post_id: PostId) -> Self {
        Self {
            comment_id,
            post_id,
        }
    }
}

#[async_trait]
impl OptimisticMutation for DeleteComment {
    type Output = ();

    fn name(&self) -> &'static str {
        "comment.delete"
    }

    fn affected_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![list_key(viewer, self.post_id), post_key(viewer, self.post_id)]
    }

    fn apply_optimistic(&self, store: &CacheStore, viewer: &Identity) -> Result<(), StoreError> {
        let key = list_key(viewer, self.post_id);
        if let Some(read) = store.get::<Vec<Comment>>(&key)? {
            let mut comments = read.into_value();
            comments.retain(|comment| comment.comment_id != self.comment_id);
            store.set(&key, &comments)?;
        }
        patch_comment_count(store, viewer, self.post_id, -1)
    }

    async fn execute(
        &self,
        remote: &dyn RemoteService,
        viewer: &Identity,
    ) -> AccessResult<Self::Output> {
        remote.comment_delete(viewer, self.comment_id).await?;
        if let Err(error) = remote.post_refresh_comment_count(self.post_id).await {
            warn!(%error, "comment count refresh failed");
        }
        Ok(())
    }

    fn aggregate_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![post_key(viewer, self.post_id), feed_key(viewer)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn setup() -> (CacheStore, Identity, PostId) {
        let store = CacheStore::new(Duration::from_secs(60));
        let viewer = Identity::new(new_entity_id(), "민호");
        (store, viewer, new_entity_id())
    }

    fn cached_comment(post_id: PostId, author: &Identity) -> Comment {
        Comment {
            comment_id: new_entity_id(),
            post_id,
            author_id: author.user_id,
            author_name: author.display_name.clone(),
            body: "원본 댓글".to_string(),
            created_at: Utc::now(),
            edited_at: None,
        }
    }

    #[test]
    fn test_add_appends_to_empty_default() {
        let (store, viewer, post_id) = setup();
        let add = AddComment::new(post_id, "첫 댓글");

        add.apply_optimistic(&store, &viewer)
            .expect("apply should succeed");

        let comments = store
            .get::<Vec<Comment>>(&list_key(&viewer, post_id))
            .expect("get should succeed")
            .expect("list should be cached")
            .into_value();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].body, "첫 댓글");
    }

    #[test]
    fn test_add_bumps_cached_post_count() {
        let (store, viewer, post_id) = setup();
        store
            .set(
                &post_key(&viewer, post_id),
                &Post {
                    post_id,
                    author_id: new_entity_id(),
                    author_name: "지은".to_string(),
                    title: "제목".to_string(),
                    body: "본문".to_string(),
                    comment_count: 2,
                    created_at: Utc::now(),
                },
            )
            .expect("set should succeed");

        AddComment::new(post_id, "댓글")
            .apply_optimistic(&store, &viewer)
            .expect("apply should succeed");

        let post = store
            .get::<Post>(&post_key(&viewer, post_id))
            .expect("get should succeed")
            .expect("post should be cached")
            .into_value();
        assert_eq!(post.comment_count, 3);
    }

    #[test]
    fn test_edit_skips_absent_list() {
        let (store, viewer, post_id) = setup();
        let edit = EditComment::new(new_entity_id(), post_id, "수정");

        edit.apply_optimistic(&store, &viewer)
            .expect("apply should succeed");

        assert!(store
            .get::<Vec<Comment>>(&list_key(&viewer, post_id))
            .expect("get should succeed")
            .is_none());
    }

    #[test]
    fn test_delete_removes_and_floors_count() {
        let (store, viewer, post_id) = setup();
        let comment = cached_comment(post_id, &viewer);
        store
            .set(&list_key(&viewer, post_id), &vec![comment.clone()])
            .expect("set should succeed");
        store
            .set(
                &post_key(&viewer, post_id),
                &Post {
                    post_id,
                    author_id: viewer.user_id,
                    author_name: viewer.display_name.clone(),
                    title: "제목".to_string(),
                    body: "본문".to_string(),
                    comment_count: 0,
                    created_at: Utc::now(),
                },
            )
            .expect("set should succeed");

        DeleteComment::new(comment.comment_id, post_id)
            .apply_optimistic(&store, &viewer)
            .expect("apply should succeed");

        let comments = store
            .get::<Vec<Comment>>(&list_key(&viewer, post_id))
            .expect("get should succeed")
            .expect("list should be cached")
            .into_value();
        assert!(comments.is_empty());

        let post = store
            .get::<Post>(&post_key(&viewer, post_id))
            .expect("get should succeed")
            .expect("post should be cached")
            .into_value();
        assert_eq!(post.comment_count, 0);
    }
}
