//! Per-entity client handles - the UI boundary.
//!
//! Each handle pairs the cache-backed reads for one entity with its
//! mutations. Reads return [`QueryResult`] (value plus loading/stale
//! flags); mutations return the settled value or the accessor error, whose
//! [`user_message`](lyceum_core::LyceumError::user_message) the UI renders.

use crate::engine::SyncEngine;
use crate::ops::{
    AddComment, ApplyToGroup, CreatePost, DeleteComment, DeleteReview, EditComment, MarkAllRead,
    MarkItemComplete, MarkNotificationRead, RecordLecturePosition, SetParticipantStatus,
    SubmitReview, ToggleBookmark,
};
use crate::query::QueryResult;
use lyceum_cache::{ChangeFeed, Freshness, RowChange, ScopedKey};
use lyceum_core::{
    BookmarkBatch, BookmarkStatus, Comment, CommentId, CourseId, CourseProgress, GroupId, Lecture,
    LectureId, LectureProgress, LyceumResult, Notification, NotificationId, ParticipantStatus,
    Post, PostId, ResourceKind, Review, ReviewId, StudyGroup, StudyParticipant, SyncConfig,
    UnreadCount, UserId,
};
use lyceum_remote::{RemoteService, SessionProvider};
use std::sync::Arc;

/// Entry point for the UI layer.
///
/// Owns the engine (and through it the store); hand out one per
/// application session, not one per screen.
#[derive(Clone)]
pub struct Client {
    engine: Arc<SyncEngine>,
}

impl Client {
    /// Build a client with a fresh cache store.
    pub fn new(
        remote: Arc<dyn RemoteService>,
        session: Arc<dyn SessionProvider>,
        config: SyncConfig,
    ) -> Self {
        Self {
            engine: Arc::new(SyncEngine::with_fresh_store(remote, session, config)),
        }
    }

    /// Build a client over an existing engine.
    pub fn from_engine(engine: Arc<SyncEngine>) -> Self {
        Self { engine }
    }

    /// The underlying engine, for wiring the realtime feed or tests.
    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    /// Create a realtime feed channel sized from the config.
    ///
    /// Hand the publisher to the subscription adapter and drive the
    /// receiver with [`lyceum_cache::pump`] against
    /// [`engine().store()`](Self::engine).
    pub fn change_feed(&self) -> (ChangeFeed, tokio::sync::mpsc::Receiver<RowChange>) {
        ChangeFeed::channel(self.engine.config().feed_buffer)
    }

    pub fn bookmarks(&self) -> Bookmarks {
        Bookmarks {
            engine: Arc::clone(&self.engine),
        }
    }

    pub fn comments(&self) -> Comments {
        Comments {
            engine: Arc::clone(&self.engine),
        }
    }

    pub fn progress(&self) -> Progress {
        Progress {
            engine: Arc::clone(&self.engine),
        }
    }

    pub fn notifications(&self) -> Notifications {
        Notifications {
            engine: Arc::clone(&self.engine),
        }
    }

    pub fn posts(&self) -> Posts {
        Posts {
            engine: Arc::clone(&self.engine),
        }
    }

    pub fn lectures(&self) -> Lectures {
        Lectures {
            engine: Arc::clone(&self.engine),
        }
    }

    pub fn reviews(&self) -> Reviews {
        Reviews {
            engine: Arc::clone(&self.engine),
        }
    }

    pub fn study(&self) -> Study {
        Study {
            engine: Arc::clone(&self.engine),
        }
    }
}

fn tolerance(engine: &SyncEngine) -> Freshness {
    Freshness::best_effort(engine.config().stale_after)
}

/// Bookmark reads and the toggle mutation. Viewer-owned; requires a session.
pub struct Bookmarks {
    engine: Arc<SyncEngine>,
}

impl Bookmarks {
    /// Bookmark flag for one lecture.
    pub async fn status(&self, lecture_id: LectureId) -> LyceumResult<QueryResult<BookmarkStatus>> {
        let viewer = self.engine.require_viewer()?;
        let key = ScopedKey::new(viewer.user_id, ResourceKind::BookmarkStatus, lecture_id);
        let remote = Arc::clone(self.engine.remote());
        self.engine
            .read_through(key, tolerance(&self.engine), || async move {
                remote.bookmark_get(&viewer, lecture_id).await.map(Some)
            })
            .await
    }

    /// Bookmark flags for every lecture the viewer has touched.
    pub async fn batch(&self) -> LyceumResult<QueryResult<BookmarkBatch>> {
        let viewer = self.engine.require_viewer()?;
        let key = ScopedKey::aggregate(viewer.user_id, ResourceKind::BookmarkBatch);
        let remote = Arc::clone(self.engine.remote());
        self.engine
            .read_through(key, tolerance(&self.engine), || async move {
                remote.bookmark_batch(&viewer).await.map(Some)
            })
            .await
    }

    /// Flip the bookmark on one lecture.
    pub async fn toggle(&self, lecture_id: LectureId) -> LyceumResult<BookmarkStatus> {
        self.engine.run(ToggleBookmark::new(lecture_id)).await
    }
}

/// Comment reads and writes.
pub struct Comments {
    engine: Arc<SyncEngine>,
}

impl Comments {
    /// Comments under one post, oldest first.
    pub async fn list(&self, post_id: PostId) -> LyceumResult<QueryResult<Vec<Comment>>> {
        let viewer = self.engine.viewer_or_anonymous();
        let key = ScopedKey::new(viewer.user_id, ResourceKind::CommentList, post_id);
        let remote = Arc::clone(self.engine.remote());
        self.engine
            .read_through(key, tolerance(&self.engine), || async move {
                remote.comment_list(post_id).await.map(Some)
            })
            .await
    }

    /// Append a comment authored by the viewer.
    pub async fn add(&self, post_id: PostId, body: impl Into<String>) -> LyceumResult<Comment> {
        self.engine.run(AddComment::new(post_id, body)).await
    }

    /// Edit the viewer's own comment.
    pub async fn edit(
        &self,
        comment_id: CommentId,
        post_id: PostId,
        body: impl Into<String>,
    ) -> LyceumResult<Comment> {
        self.engine
            .run(EditComment::new(comment_id, post_id, body))
            .await
    }

    /// Delete the viewer's own comment.
    pub async fn delete(&self, comment_id: CommentId, post_id: PostId) -> LyceumResult<()> {
        self.engine
            .run(DeleteComment::new(comment_id, post_id))
            .await
    }
}

/// Progress reads and writes. Viewer-owned; requires a session.
pub struct Progress {
    engine: Arc<SyncEngine>,
}

impl Progress {
    /// The viewer's progress for one course. Absent until first recorded.
    pub async fn course(&self, course_id: CourseId) -> LyceumResult<QueryResult<CourseProgress>> {
        let viewer = self.engine.require_viewer()?;
        let key = ScopedKey::new(viewer.user_id, ResourceKind::CourseProgress, course_id);
        let remote = Arc::clone(self.engine.remote());
        self.engine
            .read_through(key, tolerance(&self.engine), || async move {
                remote.course_progress_get(&viewer, course_id).await
            })
            .await
    }

    /// Mark one curriculum item completed.
    pub async fn mark_complete(
        &self,
        course_id: CourseId,
        item: impl Into<String>,
    ) -> LyceumResult<CourseProgress> {
        self.engine.run(MarkItemComplete::new(course_id, item)).await
    }

    /// The viewer's playback progress for one lecture.
    pub async fn lecture(
        &self,
        lecture_id: LectureId,
    ) -> LyceumResult<QueryResult<LectureProgress>> {
        let viewer = self.engine.require_viewer()?;
        let key = ScopedKey::new(viewer.user_id, ResourceKind::LectureProgress, lecture_id);
        let remote = Arc::clone(self.engine.remote());
        self.engine
            .read_through(key, tolerance(&self.engine), || async move {
                remote.lecture_progress_get(&viewer, lecture_id).await
            })
            .await
    }

    /// Record the playback position for one lecture.
    pub async fn record_position(
        &self,
        course_id: CourseId,
        lecture_id: LectureId,
        position_seconds: i64,
        completed: bool,
    ) -> LyceumResult<LectureProgress> {
        self.engine
            .run(RecordLecturePosition::new(
                course_id,
                lecture_id,
                position_seconds,
                completed,
            ))
            .await
    }
}

/// Notification inbox reads and writes. Viewer-owned; requires a session.
pub struct Notifications {
    engine: Arc<SyncEngine>,
}

impl Notifications {
    /// The viewer's inbox, newest first.
    pub async fn inbox(&self) -> LyceumResult<QueryResult<Vec<Notification>>> {
        let viewer = self.engine.require_viewer()?;
        let key = ScopedKey::aggregate(viewer.user_id, ResourceKind::NotificationList);
        let remote = Arc::clone(self.engine.remote());
        let limit = self.engine.config().page_size;
        self.engine
            .read_through(key, tolerance(&self.engine), || async move {
                remote.notification_list(&viewer, limit).await.map(Some)
            })
            .await
    }

    /// Unread count for the badge.
    pub async fn unread(&self) -> LyceumResult<QueryResult<UnreadCount>> {
        let viewer = self.engine.require_viewer()?;
        let key = ScopedKey::aggregate(viewer.user_id, ResourceKind::UnreadCount);
        let remote = Arc::clone(self.engine.remote());
        self.engine
            .read_through(key, tolerance(&self.engine), || async move {
                remote.unread_count(&viewer).await.map(Some)
            })
            .await
    }

    /// Mark one notification read.
    pub async fn mark_read(&self, notification_id: NotificationId) -> LyceumResult<Notification> {
        self.engine
            .run(MarkNotificationRead::new(notification_id))
            .await
    }

    /// Mark the whole inbox read, returning how many rows changed.
    pub async fn mark_all_read(&self) -> LyceumResult<u64> {
        self.engine.run(MarkAllRead::new()).await
    }
}

/// Community post reads and writes.
pub struct Posts {
    engine: Arc<SyncEngine>,
}

impl Posts {
    /// One post.
    pub async fn get(&self, post_id: PostId) -> LyceumResult<QueryResult<Post>> {
        let viewer = self.engine.viewer_or_anonymous();
        let key = ScopedKey::new(viewer.user_id, ResourceKind::Post, post_id);
        let remote = Arc::clone(self.engine.remote());
        self.engine
            .read_through(key, tolerance(&self.engine), || async move {
                remote.post_get(post_id).await.map(Some)
            })
            .await
    }

    /// The post feed, newest first.
    pub async fn feed(&self) -> LyceumResult<QueryResult<Vec<Post>>> {
        let viewer = self.engine.viewer_or_anonymous();
        let key = ScopedKey::aggregate(viewer.user_id, ResourceKind::PostList);
        let remote = Arc::clone(self.engine.remote());
        let limit = self.engine.config().page_size;
        self.engine
            .read_through(key, tolerance(&self.engine), || async move {
                remote.post_list(limit).await.map(Some)
            })
            .await
    }

    /// Publish a post authored by the viewer.
    pub async fn create(
        &self,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> LyceumResult<Post> {
        self.engine.run(CreatePost::new(title, body)).await
    }
}

/// Lecture catalog reads.
pub struct Lectures {
    engine: Arc<SyncEngine>,
}

impl Lectures {
    /// One lecture.
    pub async fn get(&self, lecture_id: LectureId) -> LyceumResult<QueryResult<Lecture>> {
        let viewer = self.engine.viewer_or_anonymous();
        let key = ScopedKey::new(viewer.user_id, ResourceKind::Lecture, lecture_id);
        let remote = Arc::clone(self.engine.remote());
        self.engine
            .read_through(key, tolerance(&self.engine), || async move {
                remote.lecture_get(lecture_id).await.map(Some)
            })
            .await
    }

    /// Lectures of one course in position order.
    pub async fn of_course(&self, course_id: CourseId) -> LyceumResult<QueryResult<Vec<Lecture>>> {
        let viewer = self.engine.viewer_or_anonymous();
        let key = ScopedKey::new(viewer.user_id, ResourceKind::LectureList, course_id);
        let remote = Arc::clone(self.engine.remote());
        self.engine
            .read_through(key, tolerance(&self.engine), || async move {
                remote.lecture_list(course_id).await.map(Some)
            })
            .await
    }
}

/// Review reads and writes.
pub struct Reviews {
    engine: Arc<SyncEngine>,
}

impl Reviews {
    /// Reviews of one course, newest first.
    pub async fn of_course(&self, course_id: CourseId) -> LyceumResult<QueryResult<Vec<Review>>> {
        let viewer = self.engine.viewer_or_anonymous();
        let key = ScopedKey::new(viewer.user_id, ResourceKind::ReviewList, course_id);
        let remote = Arc::clone(self.engine.remote());
        self.engine
            .read_through(key, tolerance(&self.engine), || async move {
                remote.review_list(course_id).await.map(Some)
            })
            .await
    }

    /// Submit the viewer's review of a course.
    pub async fn submit(
        &self,
        course_id: CourseId,
        rating: u8,
        body: impl Into<String>,
    ) -> LyceumResult<Review> {
        self.engine
            .run(SubmitReview::new(course_id, rating, body))
            .await
    }

    /// Delete the viewer's own review.
    pub async fn delete(&self, review_id: ReviewId, course_id: CourseId) -> LyceumResult<()> {
        self.engine.run(DeleteReview::new(review_id, course_id)).await
    }
}

/// Study group reads and participation writes.
pub struct Study {
    engine: Arc<SyncEngine>,
}

impl Study {
    /// One study group.
    pub async fn group(&self, group_id: GroupId) -> LyceumResult<QueryResult<StudyGroup>> {
        let viewer = self.engine.viewer_or_anonymous();
        let key = ScopedKey::new(viewer.user_id, ResourceKind::StudyGroup, group_id);
        let remote = Arc::clone(self.engine.remote());
        self.engine
            .read_through(key, tolerance(&self.engine), || async move {
                remote.group_get(group_id).await.map(Some)
            })
            .await
    }

    /// A group's roster in application order.
    pub async fn participants(
        &self,
        group_id: GroupId,
    ) -> LyceumResult<QueryResult<Vec<StudyParticipant>>> {
        let viewer = self.engine.viewer_or_anonymous();
        let key = ScopedKey::new(viewer.user_id, ResourceKind::ParticipantList, group_id);
        let remote = Arc::clone(self.engine.remote());
        self.engine
            .read_through(key, tolerance(&self.engine), || async move {
                remote.participant_list(group_id).await.map(Some)
            })
            .await
    }

    /// Apply to join a group as the viewer.
    pub async fn apply(&self, group_id: GroupId) -> LyceumResult<StudyParticipant> {
        self.engine.run(ApplyToGroup::new(group_id)).await
    }

    /// Approve or reject one participant of a group the viewer owns.
    pub async fn set_status(
        &self,
        group_id: GroupId,
        user_id: UserId,
        status: ParticipantStatus,
    ) -> LyceumResult<StudyParticipant> {
        self.engine
            .run(SetParticipantStatus::new(group_id, user_id, status))
            .await
    }
}
