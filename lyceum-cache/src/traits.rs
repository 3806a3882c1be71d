//! Cacheable value marker and its implementations.

use lyceum_core::{
    BookmarkBatch, BookmarkStatus, Comment, CourseProgress, Lecture, LectureProgress,
    Notification, Post, ResourceKind, Review, StudyGroup, StudyParticipant, UnreadCount,
};
use serde::{de::DeserializeOwned, Serialize};

/// Marker trait for values that can live in the cache store.
///
/// Each implementation ties a concrete value type to the [`ResourceKind`]
/// of the query that produces it, letting the store sanity-check that a
/// typed read or write matches the key it is addressed to.
///
/// # Implementation Requirements
///
/// - `kind()` must return a consistent value for all instances
/// - Implementations must be `Clone`, `Serialize`, and `DeserializeOwned`
/// - Implementations must be `Send + Sync + 'static` for async compatibility
pub trait Cacheable: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The query shape this value is cached under.
    fn kind() -> ResourceKind;
}

// ============================================================================
// IMPLEMENTATIONS FOR PLATFORM VIEWS
// ============================================================================

impl Cacheable for BookmarkStatus {
    fn kind() -> ResourceKind {
        ResourceKind::BookmarkStatus
    }
}

impl Cacheable for BookmarkBatch {
    fn kind() -> ResourceKind {
        ResourceKind::BookmarkBatch
    }
}

impl Cacheable for Vec<Comment> {
    fn kind() -> ResourceKind {
        ResourceKind::CommentList
    }
}

impl Cacheable for CourseProgress {
    fn kind() -> ResourceKind {
        ResourceKind::CourseProgress
    }
}

impl Cacheable for LectureProgress {
    fn kind() -> ResourceKind {
        ResourceKind::LectureProgress
    }
}

impl Cacheable for Vec<Notification> {
    fn kind() -> ResourceKind {
        ResourceKind::NotificationList
    }
}

impl Cacheable for UnreadCount {
    fn kind() -> ResourceKind {
        ResourceKind::UnreadCount
    }
}

impl Cacheable for Post {
    fn kind() -> ResourceKind {
        ResourceKind::Post
    }
}

impl Cacheable for Vec<Post> {
    fn kind() -> ResourceKind {
        ResourceKind::PostList
    }
}

impl Cacheable for Lecture {
    fn kind() -> ResourceKind {
        ResourceKind::Lecture
    }
}

impl Cacheable for Vec<Lecture> {
    fn kind() -> ResourceKind {
        ResourceKind::LectureList
    }
}

impl Cacheable for Vec<Review> {
    fn kind() -> ResourceKind {
        ResourceKind::ReviewList
    }
}

impl Cacheable for StudyGroup {
    fn kind() -> ResourceKind {
        ResourceKind::StudyGroup
    }
}

impl Cacheable for Vec<StudyParticipant> {
    fn kind() -> ResourceKind {
        ResourceKind::ParticipantList
    }
}
