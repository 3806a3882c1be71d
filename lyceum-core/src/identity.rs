//! Identity types for LYCEUM entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type EntityId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Identifier of a platform account.
pub type UserId = EntityId;

/// Identifier of a course.
pub type CourseId = EntityId;

/// Identifier of a lecture within a course.
pub type LectureId = EntityId;

/// Identifier of a community post.
pub type PostId = EntityId;

/// Identifier of a comment on a post.
pub type CommentId = EntityId;

/// Identifier of a notification row.
pub type NotificationId = EntityId;

/// Identifier of a study group.
pub type GroupId = EntityId;

/// Identifier of a course review.
pub type ReviewId = EntityId;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}
