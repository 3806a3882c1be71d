//! The remote accessor trait.
//!
//! One method per remote operation, one remote call per method. Accessors
//! are pure adapters: they translate a request into the backend's CRUD
//! surface and translate the response (or failure) back into domain shapes.
//! Callers that want caching or optimistic behavior layer it on top.

use crate::session::Identity;
use async_trait::async_trait;
use lyceum_core::{
    AccessResult, BookmarkBatch, BookmarkStatus, Comment, CommentId, CourseId, CourseProgress,
    GroupId, Lecture, LectureId, LectureProgress, Notification, NotificationId,
    ParticipantStatus, Post, PostId, Review, ReviewId, StudyGroup, StudyParticipant,
    UnreadCount, UserId,
};

/// Accessor surface over the hosted backend.
///
/// Mutating methods return the authoritative new row where the backend
/// hands it back cheaply (updates returning the updated row); deletions
/// return unit. Failures use the typed taxonomy in
/// [`AccessError`](lyceum_core::AccessError) and propagate unchanged.
#[async_trait]
pub trait RemoteService: Send + Sync {
    // ========================================================================
    // BOOKMARK OPERATIONS
    // ========================================================================

    /// Get the viewer's bookmark flag for one lecture.
    ///
    /// A lecture the viewer never bookmarked reads as an unbookmarked row,
    /// not as a missing one.
    async fn bookmark_get(
        &self,
        viewer: &Identity,
        lecture_id: LectureId,
    ) -> AccessResult<BookmarkStatus>;

    /// Get bookmark flags for every lecture the viewer has touched.
    async fn bookmark_batch(&self, viewer: &Identity) -> AccessResult<BookmarkBatch>;

    /// Flip the viewer's bookmark on one lecture, returning the new row.
    async fn bookmark_toggle(
        &self,
        viewer: &Identity,
        lecture_id: LectureId,
    ) -> AccessResult<BookmarkStatus>;

    // ========================================================================
    // COMMENT OPERATIONS
    // ========================================================================

    /// List comments under a post, oldest first.
    async fn comment_list(&self, post_id: PostId) -> AccessResult<Vec<Comment>>;

    /// Insert a comment authored by the viewer, returning the new row.
    async fn comment_insert(
        &self,
        viewer: &Identity,
        post_id: PostId,
        body: String,
    ) -> AccessResult<Comment>;

    /// Edit a comment's body. Owner-only; returns the updated row.
    async fn comment_update(
        &self,
        viewer: &Identity,
        comment_id: CommentId,
        body: String,
    ) -> AccessResult<Comment>;

    /// Delete a comment. Owner-only.
    async fn comment_delete(&self, viewer: &Identity, comment_id: CommentId) -> AccessResult<()>;

    // ========================================================================
    // PROGRESS OPERATIONS
    // ========================================================================

    /// Get the viewer's progress for one course. `None` when never recorded.
    async fn course_progress_get(
        &self,
        viewer: &Identity,
        course_id: CourseId,
    ) -> AccessResult<Option<CourseProgress>>;

    /// Mark one curriculum item completed (idempotent set-insert),
    /// returning the updated row.
    async fn course_progress_mark(
        &self,
        viewer: &Identity,
        course_id: CourseId,
        item: String,
    ) -> AccessResult<CourseProgress>;

    /// Get the viewer's playback progress for one lecture.
    async fn lecture_progress_get(
        &self,
        viewer: &Identity,
        lecture_id: LectureId,
    ) -> AccessResult<Option<LectureProgress>>;

    /// Upsert the viewer's playback position for one lecture.
    async fn lecture_progress_upsert(
        &self,
        viewer: &Identity,
        lecture_id: LectureId,
        position_seconds: i64,
        completed: bool,
    ) -> AccessResult<LectureProgress>;

    // ========================================================================
    // NOTIFICATION OPERATIONS
    // ========================================================================

    /// List the viewer's notifications, newest first.
    async fn notification_list(
        &self,
        viewer: &Identity,
        limit: usize,
    ) -> AccessResult<Vec<Notification>>;

    /// Mark one notification read, returning the updated row.
    async fn notification_mark_read(
        &self,
        viewer: &Identity,
        notification_id: NotificationId,
    ) -> AccessResult<Notification>;

    /// Mark every unread notification read, returning how many changed.
    async fn notification_mark_all_read(&self, viewer: &Identity) -> AccessResult<u64>;

    /// Count the viewer's unread notifications.
    async fn unread_count(&self, viewer: &Identity) -> AccessResult<UnreadCount>;

    // ========================================================================
    // POST OPERATIONS
    // ========================================================================

    /// Get one post.
    async fn post_get(&self, post_id: PostId) -> AccessResult<Post>;

    /// List posts, newest first.
    async fn post_list(&self, limit: usize) -> AccessResult<Vec<Post>>;

    /// Create a post authored by the viewer, returning the new row.
    async fn post_insert(
        &self,
        viewer: &Identity,
        title: String,
        body: String,
    ) -> AccessResult<Post>;

    /// Recompute a post's denormalized comment counter from the comments
    /// table, returning the updated row.
    ///
    /// Callers treat this as a non-critical side call: its failure must
    /// not fail the mutation it accompanies.
    async fn post_refresh_comment_count(&self, post_id: PostId) -> AccessResult<Post>;

    // ========================================================================
    // LECTURE OPERATIONS
    // ========================================================================

    /// Get one lecture.
    async fn lecture_get(&self, lecture_id: LectureId) -> AccessResult<Lecture>;

    /// List a course's lectures in position order.
    async fn lecture_list(&self, course_id: CourseId) -> AccessResult<Vec<Lecture>>;

    // ========================================================================
    // REVIEW OPERATIONS
    // ========================================================================

    /// List a course's reviews, newest first.
    async fn review_list(&self, course_id: CourseId) -> AccessResult<Vec<Review>>;

    /// Submit the viewer's review of a course, returning the new row.
    ///
    /// One review per viewer per course; a second submission conflicts.
    async fn review_insert(
        &self,
        viewer: &Identity,
        course_id: CourseId,
        rating: u8,
        body: String,
    ) -> AccessResult<Review>;

    /// Delete a review. Owner-only.
    async fn review_delete(&self, viewer: &Identity, review_id: ReviewId) -> AccessResult<()>;

    // ========================================================================
    // STUDY GROUP OPERATIONS
    // ========================================================================

    /// Get one study group.
    async fn group_get(&self, group_id: GroupId) -> AccessResult<StudyGroup>;

    /// List a group's participants in application order.
    async fn participant_list(&self, group_id: GroupId) -> AccessResult<Vec<StudyParticipant>>;

    /// Apply to join a group as the viewer, returning the pending row.
    ///
    /// A duplicate application or a full group conflicts.
    async fn participant_apply(
        &self,
        viewer: &Identity,
        group_id: GroupId,
    ) -> AccessResult<StudyParticipant>;

    /// Approve or reject one participant. Group-owner-only; returns the
    /// updated row and touches no other participant.
    async fn participant_set_status(
        &self,
        viewer: &Identity,
        group_id: GroupId,
        user_id: UserId,
        status: ParticipantStatus,
    ) -> AccessResult<StudyParticipant>;
}
