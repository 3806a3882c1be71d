//! LYCEUM Core - Entity Types
//!
//! Pure data structures with no behavior. All other crates depend on this.
//! This crate contains ONLY data types - no business logic.

pub mod config;
pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;

pub use config::SyncConfig;
pub use entities::{
    BookmarkBatch, BookmarkStatus, Comment, CourseProgress, Lecture, LectureProgress,
    Notification, Post, Review, StudyGroup, StudyParticipant, UnreadCount,
};
pub use enums::{NotificationKind, ParticipantStatus, ResourceKind};
pub use error::{AccessError, AccessResult, FeedError, LyceumError, LyceumResult, StoreError};
pub use identity::{
    new_entity_id, CommentId, CourseId, EntityId, GroupId, LectureId, NotificationId, PostId,
    ReviewId, Timestamp, UserId,
};
