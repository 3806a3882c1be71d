//! LYCEUM Test Utilities
//!
//! Centralized test infrastructure for the LYCEUM workspace:
//! - Fixtures for every domain record
//! - A pre-seeded in-memory remote
//! - Proptest generators for ids, kinds, and cache keys
//! - Test logging initialization

// Re-export the reference backend and session types from their source crates
pub use lyceum_remote::{InMemoryRemote, Identity, SessionProvider, StaticSession};

// Re-export core types for convenience
pub use lyceum_core::{
    new_entity_id, AccessError, BookmarkBatch, BookmarkStatus, Comment, CourseId, CourseProgress,
    Lecture, LectureId, LectureProgress, LyceumError, LyceumResult, Notification,
    NotificationKind, ParticipantStatus, Post, ResourceKind, Review, StudyGroup,
    StudyParticipant, SyncConfig, Timestamp, UnreadCount, UserId,
};

use chrono::Utc;

/// Initialize tracing for a test binary.
///
/// Safe to call from every test; only the first call installs the
/// subscriber. Respects `RUST_LOG`.
pub fn init_test_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// FIXTURES
// ============================================================================

/// A signed-in test identity.
pub fn test_identity(name: &str) -> Identity {
    Identity::new(new_entity_id(), name)
}

pub fn make_lecture(course_id: CourseId, position: i32) -> Lecture {
    Lecture {
        lecture_id: new_entity_id(),
        course_id,
        title: format!("{}강", position),
        position,
        duration_seconds: 600,
    }
}

pub fn make_post(author: &Identity) -> Post {
    Post {
        post_id: new_entity_id(),
        author_id: author.user_id,
        author_name: author.display_name.clone(),
        title: "스터디 모집합니다".to_string(),
        body: "러스트 스터디 같이 하실 분 구해요".to_string(),
        comment_count: 0,
        created_at: Utc::now(),
    }
}

pub fn make_comment(post: &Post, author: &Identity, body: &str) -> Comment {
    Comment {
        comment_id: new_entity_id(),
        post_id: post.post_id,
        author_id: author.user_id,
        author_name: author.display_name.clone(),
        body: body.to_string(),
        created_at: Utc::now(),
        edited_at: None,
    }
}

pub fn make_notification(owner: &Identity, read: bool) -> Notification {
    Notification {
        notification_id: new_entity_id(),
        user_id: owner.user_id,
        kind: NotificationKind::CourseNotice,
        message: "새로운 공지가 등록되었습니다".to_string(),
        read,
        created_at: Utc::now(),
    }
}

pub fn make_group(owner: &Identity, capacity: i32) -> StudyGroup {
    StudyGroup {
        group_id: new_entity_id(),
        owner_id: owner.user_id,
        title: "러스트 스터디".to_string(),
        capacity,
        created_at: Utc::now(),
    }
}

pub fn make_participant(
    group: &StudyGroup,
    member: &Identity,
    status: ParticipantStatus,
) -> StudyParticipant {
    StudyParticipant {
        group_id: group.group_id,
        user_id: member.user_id,
        display_name: member.display_name.clone(),
        status,
        applied_at: Utc::now(),
    }
}

/// A remote pre-seeded with a small course catalog: one course worth of
/// lectures, one community post, and one study group owned by `owner`.
pub fn seeded_remote(owner: &Identity) -> (InMemoryRemote, SeededCatalog) {
    let remote = InMemoryRemote::new();
    let course_id = new_entity_id();

    let lectures = vec![
        make_lecture(course_id, 1),
        make_lecture(course_id, 2),
        make_lecture(course_id, 3),
    ];
    for lecture in &lectures {
        remote.seed_lecture(lecture.clone());
    }

    let post = make_post(owner);
    remote.seed_post(post.clone());

    let group = make_group(owner, 4);
    remote.seed_group(group.clone());

    let catalog = SeededCatalog {
        course_id,
        lectures,
        post,
        group,
    };
    (remote, catalog)
}

/// Ids and rows seeded by [`seeded_remote`].
#[derive(Debug, Clone)]
pub struct SeededCatalog {
    pub course_id: CourseId,
    pub lectures: Vec<Lecture>,
    pub post: Post,
    pub group: StudyGroup,
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use lyceum_cache::ScopedKey;
    use lyceum_core::{ResourceKind, Timestamp};
    use proptest::prelude::*;
    use uuid::Uuid;

    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    pub fn arb_resource_kind() -> impl Strategy<Value = ResourceKind> {
        (0u8..14).prop_map(|b| ResourceKind::from_byte(b).expect("valid kind byte"))
    }

    pub fn arb_scoped_key() -> impl Strategy<Value = ScopedKey> {
        (arb_uuid(), arb_resource_kind(), arb_uuid())
            .prop_map(|(user, kind, subject)| ScopedKey::new(user, kind, subject))
    }

    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        // 2000-01-01 through 2100-ish, in seconds
        (946_684_800i64..4_102_444_800i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).expect("valid timestamp range")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_remote_catalog_is_consistent() {
        let owner = test_identity("민호");
        let (_remote, catalog) = seeded_remote(&owner);

        assert_eq!(catalog.lectures.len(), 3);
        assert!(catalog
            .lectures
            .iter()
            .all(|l| l.course_id == catalog.course_id));
        assert_eq!(catalog.group.owner_id, owner.user_id);
        assert_eq!(catalog.post.author_id, owner.user_id);
    }
}
