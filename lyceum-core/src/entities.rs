//! Domain records cached by the client data layer.
//!
//! Each struct mirrors one row shape (or one derived view) served by the
//! hosted backend. These are the values stored in the cache and returned
//! by accessors; they carry no behavior beyond what serde needs.

use crate::enums::{NotificationKind, ParticipantStatus};
use crate::identity::{
    CommentId, CourseId, GroupId, LectureId, NotificationId, PostId, ReviewId, Timestamp, UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bookmark flag for one lecture as seen by one viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkStatus {
    pub lecture_id: LectureId,
    pub user_id: UserId,
    pub bookmarked: bool,
    pub updated_at: Timestamp,
}

/// Bookmark flags for every lecture the viewer has touched.
///
/// BTreeMap keeps the serialized form deterministic, which matters for
/// snapshot-exact rollback comparisons in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkBatch {
    pub bookmarked: BTreeMap<LectureId, bool>,
}

/// One comment under a community post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub author_name: String,
    pub body: String,
    pub created_at: Timestamp,
    pub edited_at: Option<Timestamp>,
}

/// One community post with its denormalized comment counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: PostId,
    pub author_id: UserId,
    pub author_name: String,
    pub title: String,
    pub body: String,
    pub comment_count: i64,
    pub created_at: Timestamp,
}

/// Completed curriculum items for one course and one viewer.
///
/// Items are curriculum slugs, not lecture ids: a curriculum entry may be a
/// quiz or reading that has no lecture row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseProgress {
    pub course_id: CourseId,
    pub user_id: UserId,
    pub completed_items: Vec<String>,
    pub updated_at: Timestamp,
}

/// Playback progress for one lecture and one viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LectureProgress {
    pub lecture_id: LectureId,
    pub user_id: UserId,
    pub position_seconds: i64,
    pub completed: bool,
    pub updated_at: Timestamp,
}

/// One notification row in the viewer's inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: NotificationId,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub message: String,
    pub read: bool,
    pub created_at: Timestamp,
}

/// Unread-notification counter for the viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    pub count: i64,
}

/// One lecture row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecture {
    pub lecture_id: LectureId,
    pub course_id: CourseId,
    pub title: String,
    pub position: i32,
    pub duration_seconds: i64,
}

/// One course review. A viewer writes at most one review per course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: ReviewId,
    pub course_id: CourseId,
    pub author_id: UserId,
    pub author_name: String,
    pub rating: u8,
    pub body: String,
    pub created_at: Timestamp,
}

/// One study group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyGroup {
    pub group_id: GroupId,
    pub owner_id: UserId,
    pub title: String,
    pub capacity: i32,
    pub created_at: Timestamp,
}

/// One participant row of a study group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyParticipant {
    pub group_id: GroupId,
    pub user_id: UserId,
    pub display_name: String,
    pub status: ParticipantStatus,
    pub applied_at: Timestamp,
}
