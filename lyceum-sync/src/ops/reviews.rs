//! Course review writes.

use crate::mutation::OptimisticMutation;
use async_trait::async_trait;
use chrono::Utc;
use lyceum_cache::{CacheStore, ScopedKey};
use lyceum_core::{
    new_entity_id, AccessResult, CourseId, ResourceKind, Review, ReviewId, StoreError,
};
use lyceum_remote::{Identity, RemoteService};

fn list_key(viewer: &Identity, course_id: CourseId) -> ScopedKey {
    ScopedKey::new(viewer.user_id, ResourceKind::ReviewList, course_id)
}

/// Submit the viewer's review of a course.
///
/// The backend enforces one review per viewer per course; a duplicate
/// submission settles as a conflict and rolls the optimistic row back.
#[derive(Debug, Clone)]
pub struct SubmitReview {
    course_id: CourseId,
    rating: u8,
    body: String,
    speculative_id: ReviewId,
}

impl SubmitReview {
    pub fn new(course_id: CourseId, rating: u8, body: impl Into<String>) -> Self {
        Self {
            course_id,
            rating,
            body: body.into(),
            speculative_id: new_entity_id(),
        }
    }
}

#[async_trait]
impl OptimisticMutation for SubmitReview {
    type Output = Review;

    fn name(&self) -> &'static str {
        "review.submit"
    }

    fn affected_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![list_key(viewer, self.course_id)]
    }

    fn apply_optimistic(&self, store: &CacheStore, viewer: &Identity) -> Result<(), StoreError> {
        let key = list_key(viewer, self.course_id);
        let mut reviews = store
            .get::<Vec<Review>>(&key)?
            .map(|read| read.into_value())
            .unwrap_or_default();
        // Newest first, matching the remote ordering.
        reviews.insert(
            0,
            Review {
                review_id: self.speculative_id,
                course_id: self.course_id,
                author_id: viewer.user_id,
                author_name: viewer.display_name.clone(),
                rating: self.rating,
                body: self.body.clone(),
                created_at: Utc::now(),
            },
        );
        store.set(&key, &reviews)
    }

    async fn execute(
        &self,
        remote: &dyn RemoteService,
        viewer: &Identity,
    ) -> AccessResult<Self::Output> {
        remote
            .review_insert(viewer, self.course_id, self.rating, self.body.clone())
            .await
    }

    fn reconcile(
        &self,
        store: &CacheStore,
        viewer: &Identity,
        output: &Self::Output,
    ) -> Result<(), StoreError> {
        let key = list_key(viewer, self.course_id);
        if let Some(read) = store.get::<Vec<Review>>(&key)? {
            let mut reviews = read.into_value();
            for review in reviews.iter_mut() {
                if review.review_id == self.speculative_id {
                    *review = output.clone();
                }
            }
            store.set(&key, &reviews)?;
        }
        Ok(())
    }
}

/// Delete the viewer's own review.
#[derive(Debug, Clone)]
pub struct DeleteReview {
    review_id: ReviewId,
    course_id: CourseId,
}

impl DeleteReview {
    pub fn new(review_id: ReviewId, course_id: CourseId) -> Self {
        Self {
            review_id,
            course_id,
        }
    }
}

#[async_trait]
impl OptimisticMutation for DeleteReview {
    type Output = ();

    fn name(&self) -> &'static str {
        "review.delete"
    }

    fn affected_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![list_key(viewer, self.course_id)]
    }

    fn apply_optimistic(&self, store: &CacheStore, viewer: &Identity) -> Result<(), StoreError> {
        let key = list_key(viewer, self.course_id);
        if let Some(read) = store.get::<Vec<Review>>(&key)? {
            let mut reviews = read.into_value();
            reviews.retain(|review| review.review_id != self.review_id);
            store.set(&key, &reviews)?;
        }
        Ok(())
    }

    async fn execute(
        &self,
        remote: &dyn RemoteService,
        viewer: &Identity,
    ) -> AccessResult<Self::Output> {
        remote.review_delete(viewer, self.review_id).await
    }
}
