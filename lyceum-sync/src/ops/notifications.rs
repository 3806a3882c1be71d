//! Notification inbox writes.

use crate::mutation::OptimisticMutation;
use async_trait::async_trait;
use lyceum_cache::{CacheStore, ScopedKey};
use lyceum_core::{
    AccessResult, Notification, NotificationId, ResourceKind, StoreError, UnreadCount,
};
use lyceum_remote::{Identity, RemoteService};

fn inbox_key(viewer: &Identity) -> ScopedKey {
    ScopedKey::aggregate(viewer.user_id, ResourceKind::NotificationList)
}

fn count_key(viewer: &Identity) -> ScopedKey {
    ScopedKey::aggregate(viewer.user_id, ResourceKind::UnreadCount)
}

/// Mark one notification read.
#[derive(Debug, Clone)]
pub struct MarkNotificationRead {
    notification_id: NotificationId,
}

impl MarkNotificationRead {
    pub fn new(notification_id: NotificationId) -> Self {
        Self { notification_id }
    }
}

#[async_trait]
impl OptimisticMutation for MarkNotificationRead {
    type Output = Notification;

    fn name(&self) -> &'static str {
        "notification.mark_read"
    }

    fn affected_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![inbox_key(viewer), count_key(viewer)]
    }

    fn apply_optimistic(&self, store: &CacheStore, viewer: &Identity) -> Result<(), StoreError> {
        // Decrement only when the cached row was actually unread, so a
        // repeated mark does not drift the counter.
        let mut was_unread = false;
        let inbox = inbox_key(viewer);
        if let Some(read) = store.get::<Vec<Notification>>(&inbox)? {
            let mut rows = read.into_value();
            for row in rows.iter_mut() {
                if row.notification_id == self.notification_id {
                    was_unread = !row.read;
                    row.read = true;
                }
            }
            store.set(&inbox, &rows)?;
        } else {
            // Inbox not cached: assume unread, the aggregate invalidation
            // converges the counter either way.
            was_unread = true;
        }

        let count = count_key(viewer);
        if let Some(read) = store.get::<UnreadCount>(&count)? {
            let mut value = read.into_value();
            if was_unread {
                value.count = (value.count - 1).max(0);
            }
            store.set(&count, &value)?;
        }
        Ok(())
    }

    async fn execute(
        &self,
        remote: &dyn RemoteService,
        viewer: &Identity,
    ) -> AccessResult<Self::Output> {
        remote
            .notification_mark_read(viewer, self.notification_id)
            .await
    }

    fn reconcile(
        &self,
        store: &CacheStore,
        viewer: &Identity,
        output: &Self::Output,
    ) -> Result<(), StoreError> {
        let inbox = inbox_key(viewer);
        if let Some(read) = store.get::<Vec<Notification>>(&inbox)? {
            let mut rows = read.into_value();
            for row in rows.iter_mut() {
                if row.notification_id == self.notification_id {
                    *row = output.clone();
                }
            }
            store.set(&inbox, &rows)?;
        }
        Ok(())
    }

    fn aggregate_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![count_key(viewer)]
    }
}

/// Mark every notification in the inbox read.
#[derive(Debug, Clone, Default)]
pub struct MarkAllRead;

impl MarkAllRead {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OptimisticMutation for MarkAllRead {
    type Output = u64;

    fn name(&self) -> &'static str {
        "notification.mark_all_read"
    }

    fn affected_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![inbox_key(viewer), count_key(viewer)]
    }

    fn apply_optimistic(&self, store: &CacheStore, viewer: &Identity) -> Result<(), StoreError> {
        let inbox = inbox_key(viewer);
        if let Some(read) = store.get::<Vec<Notification>>(&inbox)? {
            let mut rows = read.into_value();
            for row in rows.iter_mut() {
                row.read = true;
            }
            store.set(&inbox, &rows)?;
        }
        store.set(&count_key(viewer), &UnreadCount { count: 0 })
    }

    async fn execute(
        &self,
        remote: &dyn RemoteService,
        viewer: &Identity,
    ) -> AccessResult<Self::Output> {
        remote.notification_mark_all_read(viewer).await
    }

    fn aggregate_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![count_key(viewer)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lyceum_core::{new_entity_id, NotificationKind};
    use std::time::Duration;

    fn setup() -> (CacheStore, Identity) {
        (
            CacheStore::new(Duration::from_secs(60)),
            Identity::new(new_entity_id(), "민호"),
        )
    }

    fn unread(viewer: &Identity) -> Notification {
        Notification {
            notification_id: new_entity_id(),
            user_id: viewer.user_id,
            kind: NotificationKind::CommentReply,
            message: "답글이 달렸습니다".to_string(),
            read: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_mark_read_decrements_counter_once() {
        let (store, viewer) = setup();
        let row = unread(&viewer);
        store
            .set(&inbox_key(&viewer), &vec![row.clone()])
            .expect("set should succeed");
        store
            .set(&count_key(&viewer), &UnreadCount { count: 1 })
            .expect("set should succeed");

        let mark = MarkNotificationRead::new(row.notification_id);
        mark.apply_optimistic(&store, &viewer)
            .expect("apply should succeed");
        // Second apply sees the row already read; counter must not drift.
        mark.apply_optimistic(&store, &viewer)
            .expect("apply should succeed");

        let count = store
            .get::<UnreadCount>(&count_key(&viewer))
            .expect("get should succeed")
            .expect("count should be cached")
            .into_value();
        assert_eq!(count.count, 0);
    }

    #[test]
    fn test_mark_read_floors_counter_at_zero() {
        let (store, viewer) = setup();
        store
            .set(&count_key(&viewer), &UnreadCount { count: 0 })
            .expect("set should succeed");

        MarkNotificationRead::new(new_entity_id())
            .apply_optimistic(&store, &viewer)
            .expect("apply should succeed");

        let count = store
            .get::<UnreadCount>(&count_key(&viewer))
            .expect("get should succeed")
            .expect("count should be cached")
            .into_value();
        assert_eq!(count.count, 0);
    }

    #[test]
    fn test_mark_all_read_zeroes_counter_and_rows() {
        let (store, viewer) = setup();
        store
            .set(&inbox_key(&viewer), &vec![unread(&viewer), unread(&viewer)])
            .expect("set should succeed");
        store
            .set(&count_key(&viewer), &UnreadCount { count: 2 })
            .expect("set should succeed");

        MarkAllRead::new()
            .apply_optimistic(&store, &viewer)
            .expect("apply should succeed");

        let rows = store
            .get::<Vec<Notification>>(&inbox_key(&viewer))
            .expect("get should succeed")
            .expect("inbox should be cached")
            .into_value();
        assert!(rows.iter().all(|row| row.read));

        let count = store
            .get::<UnreadCount>(&count_key(&viewer))
            .expect("get should succeed")
            .expect("count should be cached")
            .into_value();
        assert_eq!(count.count, 0);
    }
}
