//! Per-entity mutation strategies.
//!
//! One [`OptimisticMutation`](crate::OptimisticMutation) implementation
//! per write operation. Each strategy's optimistic computation mirrors the
//! backend's logic for that operation: flip the flag the backend would
//! flip, append the row it would append, bump the counter it would bump.

pub mod bookmarks;
pub mod comments;
pub mod notifications;
pub mod posts;
pub mod progress;
pub mod reviews;
pub mod study;

pub use bookmarks::ToggleBookmark;
pub use comments::{AddComment, DeleteComment, EditComment};
pub use notifications::{MarkAllRead, MarkNotificationRead};
pub use posts::CreatePost;
pub use progress::{MarkItemComplete, RecordLecturePosition};
pub use reviews::{DeleteReview, SubmitReview};
pub use study::{ApplyToGroup, SetParticipantStatus};
