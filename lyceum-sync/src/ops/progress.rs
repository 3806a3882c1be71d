//! Course and lecture progress writes.

use crate::mutation::OptimisticMutation;
use async_trait::async_trait;
use chrono::Utc;
use lyceum_cache::{CacheStore, ScopedKey};
use lyceum_core::{
    AccessResult, CourseId, CourseProgress, LectureId, LectureProgress, ResourceKind, StoreError,
};
use lyceum_remote::{Identity, RemoteService};

fn course_key(viewer: &Identity, course_id: CourseId) -> ScopedKey {
    ScopedKey::new(viewer.user_id, ResourceKind::CourseProgress, course_id)
}

fn lecture_key(viewer: &Identity, lecture_id: LectureId) -> ScopedKey {
    ScopedKey::new(viewer.user_id, ResourceKind::LectureProgress, lecture_id)
}

/// Mark one curriculum item of a course completed.
///
/// First-ever progress on a course initializes the record from the empty
/// default; a failed first write removes the speculative record entirely.
#[derive(Debug, Clone)]
pub struct MarkItemComplete {
    course_id: CourseId,
    item: String,
}

impl MarkItemComplete {
    pub fn new(course_id: CourseId, item: impl Into<String>) -> Self {
        Self {
            course_id,
            item: item.into(),
        }
    }
}

#[async_trait]
impl OptimisticMutation for MarkItemComplete {
    type Output = CourseProgress;

    fn name(&self) -> &'static str {
        "progress.mark_item"
    }

    fn affected_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![course_key(viewer, self.course_id)]
    }

    fn apply_optimistic(&self, store: &CacheStore, viewer: &Identity) -> Result<(), StoreError> {
        let key = course_key(viewer, self.course_id);
        let mut progress = store
            .get::<CourseProgress>(&key)?
            .map(|read| read.into_value())
            .unwrap_or(CourseProgress {
                course_id: self.course_id,
                user_id: viewer.user_id,
                completed_items: Vec::new(),
                updated_at: Utc::now(),
            });
        if !progress.completed_items.contains(&self.item) {
            progress.completed_items.push(self.item.clone());
        }
        progress.updated_at = Utc::now();
        store.set(&key, &progress)
    }

    async fn execute(
        &self,
        remote: &dyn RemoteService,
        viewer: &Identity,
    ) -> AccessResult<Self::Output> {
        remote
            .course_progress_mark(viewer, self.course_id, self.item.clone())
            .await
    }

    fn reconcile(
        &self,
        store: &CacheStore,
        viewer: &Identity,
        output: &Self::Output,
    ) -> Result<(), StoreError> {
        store.set(&course_key(viewer, self.course_id), output)
    }
}

/// Record the viewer's playback position for one lecture.
#[derive(Debug, Clone)]
pub struct RecordLecturePosition {
    course_id: CourseId,
    lecture_id: LectureId,
    position_seconds: i64,
    completed: bool,
}

impl RecordLecturePosition {
    pub fn new(
        course_id: CourseId,
        lecture_id: LectureId,
        position_seconds: i64,
        completed: bool,
    ) -> Self {
        Self {
            course_id,
            lecture_id,
            position_seconds,
            completed,
        }
    }
}

#[async_trait]
impl OptimisticMutation for RecordLecturePosition {
    type Output = LectureProgress;

    fn name(&self) -> &'static str {
        "progress.record_position"
    }

    fn affected_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![lecture_key(viewer, self.lecture_id)]
    }

    fn apply_optimistic(&self, store: &CacheStore, viewer: &Identity) -> Result<(), StoreError> {
        let progress = LectureProgress {
            lecture_id: self.lecture_id,
            user_id: viewer.user_id,
            position_seconds: self.position_seconds,
            completed: self.completed,
            updated_at: Utc::now(),
        };
        store.set(&lecture_key(viewer, self.lecture_id), &progress)
    }

    async fn execute(
        &self,
        remote: &dyn RemoteService,
        viewer: &Identity,
    ) -> AccessResult<Self::Output> {
        remote
            .lecture_progress_upsert(viewer, self.lecture_id, self.position_seconds, self.completed)
            .await
    }

    fn reconcile(
        &self,
        store: &CacheStore,
        viewer: &Identity,
        output: &Self::Output,
    ) -> Result<(), StoreError> {
        store.set(&lecture_key(viewer, self.lecture_id), output)
    }

    fn aggregate_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        // Lecture completion rolls up into course progress server-side;
        // refetch it lazily rather than guessing the rollup.
        vec![course_key(viewer, self.course_id)]
    }
}
