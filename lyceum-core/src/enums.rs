//! Enum discriminators shared across the workspace.

use serde::{Deserialize, Serialize};

/// Discriminator for every cacheable query shape.
///
/// Each variant names one logical query the client caches: either a single
/// row scoped to the viewer (`BookmarkStatus`, `CourseProgress`) or a list
/// or aggregate derived from one (`CommentList`, `UnreadCount`). The
/// variant participates in cache key encoding, so the byte mapping below
/// must stay exhaustive in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Bookmark flag for one lecture, as seen by the viewer.
    BookmarkStatus,
    /// Map of lecture id to bookmark flag for the whole viewer.
    BookmarkBatch,
    /// Comments under one post.
    CommentList,
    /// Completed-item progress for one course.
    CourseProgress,
    /// Playback progress for one lecture.
    LectureProgress,
    /// The viewer's notification inbox.
    NotificationList,
    /// Unread-notification counter for the viewer.
    UnreadCount,
    /// One community post.
    Post,
    /// The community post feed.
    PostList,
    /// One lecture row.
    Lecture,
    /// Lectures of one course, in position order.
    LectureList,
    /// Reviews of one course.
    ReviewList,
    /// One study group.
    StudyGroup,
    /// Participants of one study group.
    ParticipantList,
}

impl ResourceKind {
    /// Single-byte discriminant used in cache key encoding.
    pub fn to_byte(self) -> u8 {
        match self {
            ResourceKind::BookmarkStatus => 0,
            ResourceKind::BookmarkBatch => 1,
            ResourceKind::CommentList => 2,
            ResourceKind::CourseProgress => 3,
            ResourceKind::LectureProgress => 4,
            ResourceKind::NotificationList => 5,
            ResourceKind::UnreadCount => 6,
            ResourceKind::Post => 7,
            ResourceKind::PostList => 8,
            ResourceKind::Lecture => 9,
            ResourceKind::LectureList => 10,
            ResourceKind::ReviewList => 11,
            ResourceKind::StudyGroup => 12,
            ResourceKind::ParticipantList => 13,
        }
    }

    /// Inverse of [`to_byte`](Self::to_byte). Returns `None` for unknown bytes.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(ResourceKind::BookmarkStatus),
            1 => Some(ResourceKind::BookmarkBatch),
            2 => Some(ResourceKind::CommentList),
            3 => Some(ResourceKind::CourseProgress),
            4 => Some(ResourceKind::LectureProgress),
            5 => Some(ResourceKind::NotificationList),
            6 => Some(ResourceKind::UnreadCount),
            7 => Some(ResourceKind::Post),
            8 => Some(ResourceKind::PostList),
            9 => Some(ResourceKind::Lecture),
            10 => Some(ResourceKind::LectureList),
            11 => Some(ResourceKind::ReviewList),
            12 => Some(ResourceKind::StudyGroup),
            13 => Some(ResourceKind::ParticipantList),
            _ => None,
        }
    }

    /// All variants, in discriminant order. Used by tests and key proptests.
    pub fn all() -> [ResourceKind; 14] {
        [
            ResourceKind::BookmarkStatus,
            ResourceKind::BookmarkBatch,
            ResourceKind::CommentList,
            ResourceKind::CourseProgress,
            ResourceKind::LectureProgress,
            ResourceKind::NotificationList,
            ResourceKind::UnreadCount,
            ResourceKind::Post,
            ResourceKind::PostList,
            ResourceKind::Lecture,
            ResourceKind::LectureList,
            ResourceKind::ReviewList,
            ResourceKind::StudyGroup,
            ResourceKind::ParticipantList,
        ]
    }
}

/// Category of a notification row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    /// Someone replied to the viewer's comment.
    CommentReply,
    /// A study group application was approved.
    StudyApproved,
    /// A study group application was rejected.
    StudyRejected,
    /// An announcement on an enrolled course.
    CourseNotice,
}

/// Classification of a study group participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipantStatus {
    /// Applied, awaiting a decision from the group owner.
    Pending,
    /// Accepted into the group.
    Approved,
    /// Turned down by the group owner.
    Rejected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_kind_byte_roundtrip() {
        for kind in ResourceKind::all() {
            let byte = kind.to_byte();
            assert_eq!(
                ResourceKind::from_byte(byte),
                Some(kind),
                "roundtrip failed for {:?}",
                kind
            );
        }
    }

    #[test]
    fn test_resource_kind_bytes_are_distinct() {
        let kinds = ResourceKind::all();
        for (i, a) in kinds.iter().enumerate() {
            for b in kinds.iter().skip(i + 1) {
                assert_ne!(a.to_byte(), b.to_byte());
            }
        }
    }

    #[test]
    fn test_resource_kind_unknown_byte() {
        assert_eq!(ResourceKind::from_byte(200), None);
        assert_eq!(ResourceKind::from_byte(14), None);
    }
}
