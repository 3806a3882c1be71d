//! In-memory reference backend.
//!
//! Implements [`RemoteService`] over plain hash maps. This is the backend
//! tests and local development run against: it enforces the same ownership,
//! uniqueness, and existence rules the hosted backend does, and it can
//! inject failures deterministically via [`fail_next`](InMemoryRemote::fail_next).

use crate::service::RemoteService;
use crate::session::Identity;
use async_trait::async_trait;
use chrono::Utc;
use lyceum_core::{
    new_entity_id, AccessError, AccessResult, BookmarkBatch, BookmarkStatus, Comment, CommentId,
    CourseId, CourseProgress, GroupId, Lecture, LectureId, LectureProgress, Notification,
    NotificationId, ParticipantStatus, Post, PostId, ResourceKind, Review, ReviewId, StudyGroup,
    StudyParticipant, UnreadCount, UserId,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, RwLock};

#[derive(Debug, Default)]
struct Tables {
    bookmarks: HashMap<(UserId, LectureId), BookmarkStatus>,
    comments: HashMap<CommentId, Comment>,
    posts: HashMap<PostId, Post>,
    course_progress: HashMap<(UserId, CourseId), CourseProgress>,
    lecture_progress: HashMap<(UserId, LectureId), LectureProgress>,
    notifications: HashMap<NotificationId, Notification>,
    lectures: HashMap<LectureId, Lecture>,
    reviews: HashMap<ReviewId, Review>,
    groups: HashMap<GroupId, StudyGroup>,
    participants: HashMap<(GroupId, UserId), StudyParticipant>,
}

/// In-memory [`RemoteService`] implementation.
///
/// Thread-safe; state lives behind a `std::sync::RwLock` and no lock is
/// held across an await point. Seeding methods populate catalog rows
/// directly, bypassing the accessor surface.
#[derive(Debug, Default)]
pub struct InMemoryRemote {
    tables: RwLock<Tables>,
    faults: Mutex<VecDeque<AccessError>>,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a failure for the next accessor call.
    ///
    /// Faults are consumed in FIFO order, one per call, before the call
    /// touches any table. Queue several to fail several calls in a row.
    pub fn fail_next(&self, error: AccessError) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.push_back(error);
        }
    }

    fn take_fault(&self) -> AccessResult<()> {
        let mut faults = self
            .faults
            .lock()
            .map_err(|_| AccessError::transport("fault queue lock poisoned"))?;
        match faults.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn read(&self) -> AccessResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| AccessError::transport("state lock poisoned"))
    }

    fn write(&self) -> AccessResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| AccessError::transport("state lock poisoned"))
    }

    // ========================================================================
    // SEEDING (test/local-dev surface, not part of the accessor contract)
    // ========================================================================

    pub fn seed_lecture(&self, lecture: Lecture) {
        if let Ok(mut tables) = self.tables.write() {
            tables.lectures.insert(lecture.lecture_id, lecture);
        }
    }

    pub fn seed_post(&self, post: Post) {
        if let Ok(mut tables) = self.tables.write() {
            tables.posts.insert(post.post_id, post);
        }
    }

    pub fn seed_notification(&self, notification: Notification) {
        if let Ok(mut tables) = self.tables.write() {
            tables
                .notifications
                .insert(notification.notification_id, notification);
        }
    }

    pub fn seed_group(&self, group: StudyGroup) {
        if let Ok(mut tables) = self.tables.write() {
            tables.groups.insert(group.group_id, group);
        }
    }

    pub fn seed_participant(&self, participant: StudyParticipant) {
        if let Ok(mut tables) = self.tables.write() {
            tables
                .participants
                .insert((participant.group_id, participant.user_id), participant);
        }
    }

    pub fn seed_review(&self, review: Review) {
        if let Ok(mut tables) = self.tables.write() {
            tables.reviews.insert(review.review_id, review);
        }
    }
}

#[async_trait]
impl RemoteService for InMemoryRemote {
    // ========================================================================
    // BOOKMARK OPERATIONS
    // ========================================================================

    async fn bookmark_get(
        &self,
        viewer: &Identity,
        lecture_id: LectureId,
    ) -> AccessResult<BookmarkStatus> {
        self.take_fault()?;
        let tables = self.read()?;
        Ok(tables
            .bookmarks
            .get(&(viewer.user_id, lecture_id))
            .cloned()
            .unwrap_or(BookmarkStatus {
                lecture_id,
                user_id: viewer.user_id,
                bookmarked: false,
                updated_at: Utc::now(),
            }))
    }

    async fn bookmark_batch(&self, viewer: &Identity) -> AccessResult<BookmarkBatch> {
        self.take_fault()?;
        let tables = self.read()?;
        let mut batch = BookmarkBatch::default();
        for ((user_id, lecture_id), status) in &tables.bookmarks {
            if *user_id == viewer.user_id {
                batch.bookmarked.insert(*lecture_id, status.bookmarked);
            }
        }
        Ok(batch)
    }

    async fn bookmark_toggle(
        &self,
        viewer: &Identity,
        lecture_id: LectureId,
    ) -> AccessResult<BookmarkStatus> {
        self.take_fault()?;
        let mut tables = self.write()?;
        let status = tables
            .bookmarks
            .entry((viewer.user_id, lecture_id))
            .or_insert(BookmarkStatus {
                lecture_id,
                user_id: viewer.user_id,
                bookmarked: false,
                updated_at: Utc::now(),
            });
        status.bookmarked = !status.bookmarked;
        status.updated_at = Utc::now();
        Ok(status.clone())
    }

    // ========================================================================
    // COMMENT OPERATIONS
    // ========================================================================

    async fn comment_list(&self, post_id: PostId) -> AccessResult<Vec<Comment>> {
        self.take_fault()?;
        let tables = self.read()?;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.comment_id.cmp(&b.comment_id))
        });
        Ok(comments)
    }

    async fn comment_insert(
        &self,
        viewer: &Identity,
        post_id: PostId,
        body: String,
    ) -> AccessResult<Comment> {
        self.take_fault()?;
        let mut tables = self.write()?;
        if !tables.posts.contains_key(&post_id) {
            return Err(AccessError::not_found(ResourceKind::Post, post_id));
        }
        let comment = Comment {
            comment_id: new_entity_id(),
            post_id,
            author_id: viewer.user_id,
            author_name: viewer.display_name.clone(),
            body,
            created_at: Utc::now(),
            edited_at: None,
        };
        tables.comments.insert(comment.comment_id, comment.clone());
        if let Some(post) = tables.posts.get_mut(&post_id) {
            post.comment_count += 1;
        }
        Ok(comment)
    }

    async fn comment_update(
        &self,
        viewer: &Identity,
        comment_id: CommentId,
        body: String,
    ) -> AccessResult<Comment> {
        self.take_fault()?;
        let mut tables = self.write()?;
        let comment = tables
            .comments
            .get_mut(&comment_id)
            .ok_or(AccessError::not_found(ResourceKind::CommentList, comment_id))?;
        if comment.author_id != viewer.user_id {
            return Err(AccessError::denied("edit", "comment"));
        }
        comment.body = body;
        comment.edited_at = Some(Utc::now());
        Ok(comment.clone())
    }

    async fn comment_delete(&self, viewer: &Identity, comment_id: CommentId) -> AccessResult<()> {
        self.take_fault()?;
        let mut tables = self.write()?;
        let comment = tables
            .comments
            .get(&comment_id)
            .ok_or(AccessError::not_found(ResourceKind::CommentList, comment_id))?;
        if comment.author_id != viewer.user_id {
            return Err(AccessError::denied("delete", "comment"));
        }
        let post_id = comment.post_id;
        tables.comments.remove(&comment_id);
        if let Some(post) = tables.posts.get_mut(&post_id) {
            post.comment_count = (post.comment_count - 1).max(0);
        }
        Ok(())
    }

    // ========================================================================
    // PROGRESS OPERATIONS
    // ========================================================================

    async fn course_progress_get(
        &self,
        viewer: &Identity,
        course_id: CourseId,
    ) -> AccessResult<Option<CourseProgress>> {
        self.take_fault()?;
        let tables = self.read()?;
        Ok(tables
            .course_progress
            .get(&(viewer.user_id, course_id))
            .cloned())
    }

    async fn course_progress_mark(
        &self,
        viewer: &Identity,
        course_id: CourseId,
        item: String,
    ) -> AccessResult<CourseProgress> {
        self.take_fault()?;
        let mut tables = self.write()?;
        let progress = tables
            .course_progress
            .entry((viewer.user_id, course_id))
            .or_insert(CourseProgress {
                course_id,
                user_id: viewer.user_id,
                completed_items: Vec::new(),
                updated_at: Utc::now(),
            });
        if !progress.completed_items.contains(&item) {
            progress.completed_items.push(item);
        }
        progress.updated_at = Utc::now();
        Ok(progress.clone())
    }

    async fn lecture_progress_get(
        &self,
        viewer: &Identity,
        lecture_id: LectureId,
    ) -> AccessResult<Option<LectureProgress>> {
        self.take_fault()?;
        let tables = self.read()?;
        Ok(tables
            .lecture_progress
            .get(&(viewer.user_id, lecture_id))
            .cloned())
    }

    async fn lecture_progress_upsert(
        &self,
        viewer: &Identity,
        lecture_id: LectureId,
        position_seconds: i64,
        completed: bool,
    ) -> AccessResult<LectureProgress> {
        self.take_fault()?;
        let mut tables = self.write()?;
        let progress = LectureProgress {
            lecture_id,
            user_id: viewer.user_id,
            position_seconds,
            completed,
            updated_at: Utc::now(),
        };
        tables
            .lecture_progress
            .insert((viewer.user_id, lecture_id), progress.clone());
        Ok(progress)
    }

    // ========================================================================
    // NOTIFICATION OPERATIONS
    // ========================================================================

    async fn notification_list(
        &self,
        viewer: &Identity,
        limit: usize,
    ) -> AccessResult<Vec<Notification>> {
        self.take_fault()?;
        let tables = self.read()?;
        let mut rows: Vec<Notification> = tables
            .notifications
            .values()
            .filter(|n| n.user_id == viewer.user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.notification_id.cmp(&a.notification_id))
        });
        rows.truncate(limit);
        Ok(rows)
    }

    async fn notification_mark_read(
        &self,
        viewer: &Identity,
        notification_id: NotificationId,
    ) -> AccessResult<Notification> {
        self.take_fault()?;
        let mut tables = self.write()?;
        let notification = tables.notifications.get_mut(&notification_id).ok_or(
            AccessError::not_found(ResourceKind::NotificationList, notification_id),
        )?;
        if notification.user_id != viewer.user_id {
            return Err(AccessError::denied("mark read", "notification"));
        }
        notification.read = true;
        Ok(notification.clone())
    }

    async fn notification_mark_all_read(&self, viewer: &Identity) -> AccessResult<u64> {
        self.take_fault()?;
        let mut tables = self.write()?;
        let mut changed = 0u64;
        for notification in tables.notifications.values_mut() {
            if notification.user_id == viewer.user_id && !notification.read {
                notification.read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn unread_count(&self, viewer: &Identity) -> AccessResult<UnreadCount> {
        self.take_fault()?;
        let tables = self.read()?;
        let count = tables
            .notifications
            .values()
            .filter(|n| n.user_id == viewer.user_id && !n.read)
            .count() as i64;
        Ok(UnreadCount { count })
    }

    // ========================================================================
    // POST OPERATIONS
    // ========================================================================

    async fn post_get(&self, post_id: PostId) -> AccessResult<Post> {
        self.take_fault()?;
        let tables = self.read()?;
        tables
            .posts
            .get(&post_id)
            .cloned()
            .ok_or(AccessError::not_found(ResourceKind::Post, post_id))
    }

    async fn post_list(&self, limit: usize) -> AccessResult<Vec<Post>> {
        self.take_fault()?;
        let tables = self.read()?;
        let mut rows: Vec<Post> = tables.posts.values().cloned().collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.post_id.cmp(&a.post_id))
        });
        rows.truncate(limit);
        Ok(rows)
    }

    async fn post_insert(
        &self,
        viewer: &Identity,
        title: String,
        body: String,
    ) -> AccessResult<Post> {
        self.take_fault()?;
        let mut tables = self.write()?;
        let post = Post {
            post_id: new_entity_id(),
            author_id: viewer.user_id,
            author_name: viewer.display_name.clone(),
            title,
            body,
            comment_count: 0,
            created_at: Utc::now(),
        };
        tables.posts.insert(post.post_id, post.clone());
        Ok(post)
    }

    async fn post_refresh_comment_count(&self, post_id: PostId) -> AccessResult<Post> {
        self.take_fault()?;
        let mut tables = self.write()?;
        let count = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .count() as i64;
        let post = tables
            .posts
            .get_mut(&post_id)
            .ok_or(AccessError::not_found(ResourceKind::Post, post_id))?;
        post.comment_count = count;
        Ok(post.clone())
    }

    // ========================================================================
    // LECTURE OPERATIONS
    // ========================================================================

    async fn lecture_get(&self, lecture_id: LectureId) -> AccessResult<Lecture> {
        self.take_fault()?;
        let tables = self.read()?;
        tables
            .lectures
            .get(&lecture_id)
            .cloned()
            .ok_or(AccessError::not_found(ResourceKind::Lecture, lecture_id))
    }

    async fn lecture_list(&self, course_id: CourseId) -> AccessResult<Vec<Lecture>> {
        self.take_fault()?;
        let tables = self.read()?;
        let mut rows: Vec<Lecture> = tables
            .lectures
            .values()
            .filter(|l| l.course_id == course_id)
            .cloned()
            .collect();
        rows.sort_by_key(|l| l.position);
        Ok(rows)
    }

    // ========================================================================
    // REVIEW OPERATIONS
    // ========================================================================

    async fn review_list(&self, course_id: CourseId) -> AccessResult<Vec<Review>> {
        self.take_fault()?;
        let tables = self.read()?;
        let mut rows: Vec<Review> = tables
            .reviews
            .values()
            .filter(|r| r.course_id == course_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.review_id.cmp(&a.review_id))
        });
        Ok(rows)
    }

    async fn review_insert(
        &self,
        viewer: &Identity,
        course_id: CourseId,
        rating: u8,
        body: String,
    ) -> AccessResult<Review> {
        self.take_fault()?;
        if !(1..=5).contains(&rating) {
            return Err(AccessError::conflict("rating must be between 1 and 5"));
        }
        let mut tables = self.write()?;
        let duplicate = tables
            .reviews
            .values()
            .any(|r| r.course_id == course_id && r.author_id == viewer.user_id);
        if duplicate {
            return Err(AccessError::conflict("review already submitted for course"));
        }
        let review = Review {
            review_id: new_entity_id(),
            course_id,
            author_id: viewer.user_id,
            author_name: viewer.display_name.clone(),
            rating,
            body,
            created_at: Utc::now(),
        };
        tables.reviews.insert(review.review_id, review.clone());
        Ok(review)
    }

    async fn review_delete(&self, viewer: &Identity, review_id: ReviewId) -> AccessResult<()> {
        self.take_fault()?;
        let mut tables = self.write()?;
        let review = tables
            .reviews
            .get(&review_id)
            .ok_or(AccessError::not_found(ResourceKind::ReviewList, review_id))?;
        if review.author_id != viewer.user_id {
            return Err(AccessError::denied("delete", "review"));
        }
        tables.reviews.remove(&review_id);
        Ok(())
    }

    // ========================================================================
    // STUDY GROUP OPERATIONS
    // ========================================================================

    async fn group_get(&self, group_id: GroupId) -> AccessResult<StudyGroup> {
        self.take_fault()?;
        let tables = self.read()?;
        tables
            .groups
            .get(&group_id)
            .cloned()
            .ok_or(AccessError::not_found(ResourceKind::StudyGroup, group_id))
    }

    async fn participant_list(&self, group_id: GroupId) -> AccessResult<Vec<StudyParticipant>> {
        self.take_fault()?;
        let tables = self.read()?;
        let mut rows: Vec<StudyParticipant> = tables
            .participants
            .values()
            .filter(|p| p.group_id == group_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.applied_at
                .cmp(&b.applied_at)
                .then(a.user_id.cmp(&b.user_id))
        });
        Ok(rows)
    }

    async fn participant_apply(
        &self,
        viewer: &Identity,
        group_id: GroupId,
    ) -> AccessResult<StudyParticipant> {
        self.take_fault()?;
        let mut tables = self.write()?;
        let group = tables
            .groups
            .get(&group_id)
            .ok_or(AccessError::not_found(ResourceKind::StudyGroup, group_id))?;
        if tables
            .participants
            .contains_key(&(group_id, viewer.user_id))
        {
            return Err(AccessError::conflict("already applied to study group"));
        }
        let approved = tables
            .participants
            .values()
            .filter(|p| p.group_id == group_id && p.status == ParticipantStatus::Approved)
            .count() as i32;
        if approved >= group.capacity {
            return Err(AccessError::conflict("study group is full"));
        }
        let participant = StudyParticipant {
            group_id,
            user_id: viewer.user_id,
            display_name: viewer.display_name.clone(),
            status: ParticipantStatus::Pending,
            applied_at: Utc::now(),
        };
        tables
            .participants
            .insert((group_id, viewer.user_id), participant.clone());
        Ok(participant)
    }

    async fn participant_set_status(
        &self,
        viewer: &Identity,
        group_id: GroupId,
        user_id: UserId,
        status: ParticipantStatus,
    ) -> AccessResult<StudyParticipant> {
        self.take_fault()?;
        let mut tables = self.write()?;
        let group = tables
            .groups
            .get(&group_id)
            .ok_or(AccessError::not_found(ResourceKind::StudyGroup, group_id))?;
        if group.owner_id != viewer.user_id {
            return Err(AccessError::denied("manage", "study group"));
        }
        let participant = tables
            .participants
            .get_mut(&(group_id, user_id))
            .ok_or(AccessError::not_found(ResourceKind::ParticipantList, user_id))?;
        participant.status = status;
        Ok(participant.clone())
    }
}
