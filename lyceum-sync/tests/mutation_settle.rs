//! Settle-cycle behavior of the mutation engine: optimistic success paths,
//! rollback on failure, and the auth short circuit.

use lyceum_cache::ScopedKey;
use lyceum_core::{
    AccessError, BookmarkStatus, Comment, CourseProgress, LyceumError, ParticipantStatus,
    ResourceKind, SyncConfig,
};
use lyceum_remote::{InMemoryRemote, RemoteService, SessionProvider, StaticSession};
use lyceum_sync::Client;
use lyceum_test_utils::{
    init_test_logging, make_participant, seeded_remote, test_identity, Identity, SeededCatalog,
};
use std::sync::Arc;

struct Harness {
    client: Client,
    remote: Arc<InMemoryRemote>,
    session: Arc<StaticSession>,
    catalog: SeededCatalog,
    owner: Identity,
}

fn harness() -> Harness {
    init_test_logging();
    let owner = test_identity("민호");
    let (remote, catalog) = seeded_remote(&owner);
    let remote = Arc::new(remote);
    let session = Arc::new(StaticSession::signed_in(owner.clone()));
    let client = Client::new(
        Arc::clone(&remote) as Arc<dyn RemoteService>,
        Arc::clone(&session) as Arc<dyn SessionProvider>,
        SyncConfig::default(),
    );
    Harness {
        client,
        remote,
        session,
        catalog,
        owner,
    }
}

#[tokio::test]
async fn bookmark_toggle_settles_in_status_and_batch() {
    let h = harness();
    let lecture_id = h.catalog.lectures[0].lecture_id;

    // Warm the batch cache so the toggle has a map entry to patch.
    h.client
        .bookmarks()
        .batch()
        .await
        .expect("batch read should succeed");

    let status = h
        .client
        .bookmarks()
        .toggle(lecture_id)
        .await
        .expect("toggle should succeed");
    assert!(status.bookmarked);

    let read = h
        .client
        .bookmarks()
        .status(lecture_id)
        .await
        .expect("status read should succeed");
    assert_eq!(read.value.map(|s| s.bookmarked), Some(true));

    let batch = h
        .client
        .bookmarks()
        .batch()
        .await
        .expect("batch read should succeed");
    let batch = batch.value.expect("batch should have a value");
    assert_eq!(batch.bookmarked.get(&lecture_id), Some(&true));
}

#[tokio::test]
async fn bookmark_toggle_rolls_back_on_transport_failure() {
    let h = harness();
    let lecture_id = h.catalog.lectures[0].lecture_id;

    // Cache the unbookmarked status first.
    h.client
        .bookmarks()
        .status(lecture_id)
        .await
        .expect("status read should succeed");

    h.remote
        .fail_next(AccessError::transport("connection reset"));
    let error = h
        .client
        .bookmarks()
        .toggle(lecture_id)
        .await
        .expect_err("toggle should fail");
    assert_eq!(error.user_message(), "처리에 실패했습니다");

    let key = ScopedKey::new(h.owner.user_id, ResourceKind::BookmarkStatus, lecture_id);
    let read = h
        .client
        .engine()
        .peek::<BookmarkStatus>(&key)
        .expect("peek should succeed");
    assert_eq!(read.value.map(|s| s.bookmarked), Some(false));
}

#[tokio::test]
async fn toggle_twice_returns_to_original_state() {
    let h = harness();
    let lecture_id = h.catalog.lectures[1].lecture_id;

    let first = h
        .client
        .bookmarks()
        .toggle(lecture_id)
        .await
        .expect("toggle should succeed");
    let second = h
        .client
        .bookmarks()
        .toggle(lecture_id)
        .await
        .expect("toggle should succeed");

    assert!(first.bookmarked);
    assert!(!second.bookmarked);
    assert_ne!(first.bookmarked, second.bookmarked);

    // Back to the pre-toggle truth server-side as well.
    let remote_status = h
        .remote
        .bookmark_get(&h.owner, lecture_id)
        .await
        .expect("remote get should succeed");
    assert!(!remote_status.bookmarked);
}

#[tokio::test]
async fn signed_out_mutation_fails_before_any_cache_write() {
    let h = harness();
    let lecture_id = h.catalog.lectures[0].lecture_id;
    h.session.sign_out();

    let error = h
        .client
        .bookmarks()
        .toggle(lecture_id)
        .await
        .expect_err("toggle should fail signed out");
    assert!(matches!(
        error,
        LyceumError::Access(AccessError::AuthenticationRequired)
    ));
    assert_eq!(error.user_message(), "로그인이 필요합니다");

    // Nothing was written or snapshotted.
    assert!(h
        .client
        .engine()
        .store()
        .is_empty()
        .expect("store should be readable"));
}

#[tokio::test]
async fn first_progress_write_initializes_and_failed_write_leaves_nothing() {
    let h = harness();
    let course_id = h.catalog.course_id;

    let progress = h
        .client
        .progress()
        .mark_complete(course_id, "item-7")
        .await
        .expect("mark should succeed");
    assert_eq!(progress.completed_items, vec!["item-7".to_string()]);

    let key = ScopedKey::new(h.owner.user_id, ResourceKind::CourseProgress, course_id);
    let read = h
        .client
        .engine()
        .peek::<CourseProgress>(&key)
        .expect("peek should succeed");
    assert_eq!(
        read.value.map(|p| p.completed_items),
        Some(vec!["item-7".to_string()])
    );

    // Same first-ever interaction against another course, but failing:
    // the speculative entry must be removed, not left half-populated.
    let other_course = lyceum_core::new_entity_id();
    h.remote
        .fail_next(AccessError::transport("connection reset"));
    h.client
        .progress()
        .mark_complete(other_course, "item-1")
        .await
        .expect_err("mark should fail");

    let other_key = ScopedKey::new(h.owner.user_id, ResourceKind::CourseProgress, other_course);
    let read = h
        .client
        .engine()
        .peek::<CourseProgress>(&other_key)
        .expect("peek should succeed");
    assert!(read.value.is_none());
}

#[tokio::test]
async fn failed_comment_add_restores_list_snapshot_exactly() {
    let h = harness();
    let post_id = h.catalog.post.post_id;

    h.client
        .comments()
        .add(post_id, "첫 댓글")
        .await
        .expect("first comment should succeed");
    h.client
        .comments()
        .list(post_id)
        .await
        .expect("list read should succeed");

    let key = ScopedKey::new(h.owner.user_id, ResourceKind::CommentList, post_id);
    let before = h
        .client
        .engine()
        .store()
        .raw(&key)
        .expect("raw should succeed");

    h.remote
        .fail_next(AccessError::transport("connection reset"));
    h.client
        .comments()
        .add(post_id, "실패할 댓글")
        .await
        .expect_err("second comment should fail");

    let after = h
        .client
        .engine()
        .store()
        .raw(&key)
        .expect("raw should succeed");
    assert_eq!(before, after);
}

#[tokio::test]
async fn not_found_failure_rolls_back_and_invalidates() {
    let h = harness();
    let ghost_post = lyceum_core::new_entity_id();
    let key = ScopedKey::new(h.owner.user_id, ResourceKind::CommentList, ghost_post);

    // A stale "exists" view of a post that is gone server-side.
    h.client
        .engine()
        .store()
        .set(&key, &Vec::<Comment>::new())
        .expect("set should succeed");

    let error = h
        .client
        .comments()
        .add(ghost_post, "유령 게시글 댓글")
        .await
        .expect_err("add should fail");
    assert!(matches!(
        error,
        LyceumError::Access(AccessError::NotFound { .. })
    ));
    assert_eq!(error.user_message(), "대상을 찾을 수 없습니다");

    // Rolled back to the empty list, but marked stale so the next read
    // refetches instead of trusting the restored view.
    let read = h
        .client
        .engine()
        .store()
        .get::<Vec<Comment>>(&key)
        .expect("get should succeed")
        .expect("entry should remain");
    assert!(read.value().is_empty());
    assert!(read.is_stale());
}

#[tokio::test]
async fn approving_one_participant_leaves_others_untouched() {
    let h = harness();
    let group = h.catalog.group.clone();

    let p1_identity = test_identity("지은");
    let p2_identity = test_identity("하늘");
    let p1 = make_participant(&group, &p1_identity, ParticipantStatus::Pending);
    let p2 = make_participant(&group, &p2_identity, ParticipantStatus::Pending);
    h.remote.seed_participant(p1.clone());
    h.remote.seed_participant(p2.clone());

    // Warm the roster cache, then approve p1 as the group owner.
    h.client
        .study()
        .participants(group.group_id)
        .await
        .expect("roster read should succeed");
    h.client
        .study()
        .set_status(group.group_id, p1.user_id, ParticipantStatus::Approved)
        .await
        .expect("approval should succeed");

    let roster = h
        .client
        .study()
        .participants(group.group_id)
        .await
        .expect("roster read should succeed");
    let roster = roster.value.expect("roster should have a value");

    let p1_row = roster
        .iter()
        .find(|p| p.user_id == p1.user_id)
        .expect("p1 should be present");
    let p2_row = roster
        .iter()
        .find(|p| p.user_id == p2.user_id)
        .expect("p2 should be present");
    assert_eq!(p1_row.status, ParticipantStatus::Approved);
    assert_eq!(p2_row.status, ParticipantStatus::Pending);
}

#[tokio::test]
async fn duplicate_study_application_surfaces_conflict() {
    let h = harness();
    let group_id = h.catalog.group.group_id;
    let applicant = test_identity("지은");
    h.session.sign_in(applicant.clone());

    h.client
        .study()
        .apply(group_id)
        .await
        .expect("first application should succeed");
    let error = h
        .client
        .study()
        .apply(group_id)
        .await
        .expect_err("second application should conflict");
    assert!(matches!(
        error,
        LyceumError::Access(AccessError::Conflict { .. })
    ));
    assert_eq!(error.user_message(), "이미 처리된 요청입니다");
}

#[tokio::test]
async fn successful_mutation_matches_remote_after_settle() {
    let h = harness();
    let post_id = h.catalog.post.post_id;

    let created = h
        .client
        .comments()
        .add(post_id, "정합성 확인")
        .await
        .expect("add should succeed");

    let cached = h
        .client
        .comments()
        .list(post_id)
        .await
        .expect("list read should succeed");
    let remote_truth = h
        .remote
        .comment_list(post_id)
        .await
        .expect("remote list should succeed");

    assert_eq!(cached.value, Some(remote_truth.clone()));
    assert!(remote_truth
        .iter()
        .any(|c| c.comment_id == created.comment_id));
}

#[tokio::test]
async fn non_owner_comment_edit_is_denied_and_rolled_back() {
    let h = harness();
    let post_id = h.catalog.post.post_id;

    // Comment authored by the owner.
    let comment = h
        .client
        .comments()
        .add(post_id, "원본")
        .await
        .expect("add should succeed");

    // A different account tries to edit it.
    let stranger = test_identity("지은");
    h.session.sign_in(stranger.clone());
    h.client
        .comments()
        .list(post_id)
        .await
        .expect("list read should succeed");

    let error = h
        .client
        .comments()
        .edit(comment.comment_id, post_id, "탈취 시도")
        .await
        .expect_err("edit should be denied");
    assert_eq!(error.user_message(), "권한이 없습니다");

    let list = h
        .client
        .comments()
        .list(post_id)
        .await
        .expect("list read should succeed");
    let list = list.value.expect("list should have a value");
    assert_eq!(list[0].body, "원본");
}
