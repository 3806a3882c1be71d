//! Study group participation writes.

use crate::mutation::OptimisticMutation;
use async_trait::async_trait;
use chrono::Utc;
use lyceum_cache::{CacheStore, ScopedKey};
use lyceum_core::{
    AccessResult, GroupId, ParticipantStatus, ResourceKind, StoreError, StudyParticipant, UserId,
};
use lyceum_remote::{Identity, RemoteService};

fn roster_key(viewer: &Identity, group_id: GroupId) -> ScopedKey {
    ScopedKey::new(viewer.user_id, ResourceKind::ParticipantList, group_id)
}

fn group_key(viewer: &Identity, group_id: GroupId) -> ScopedKey {
    ScopedKey::new(viewer.user_id, ResourceKind::StudyGroup, group_id)
}

/// Apply to join a study group as the viewer.
#[derive(Debug, Clone)]
pub struct ApplyToGroup {
    group_id: GroupId,
}

impl ApplyToGroup {
    pub fn new(group_id: GroupId) -> Self {
        Self { group_id }
    }
}

#[async_trait]
impl OptimisticMutation for ApplyToGroup {
    type Output = StudyParticipant;

    fn name(&self) -> &'static str {
        "study.apply"
    }

    fn affected_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![roster_key(viewer, self.group_id)]
    }

    fn apply_optimistic(&self, store: &CacheStore, viewer: &Identity) -> Result<(), StoreError> {
        let key = roster_key(viewer, self.group_id);
        let mut roster = store
            .get::<Vec<StudyParticipant>>(&key)?
            .map(|read| read.into_value())
            .unwrap_or_default();
        roster.push(StudyParticipant {
            group_id: self.group_id,
            user_id: viewer.user_id,
            display_name: viewer.display_name.clone(),
            status: ParticipantStatus::Pending,
            applied_at: Utc::now(),
        });
        store.set(&key, &roster)
    }

    async fn execute(
        &self,
        remote: &dyn RemoteService,
        viewer: &Identity,
    ) -> AccessResult<Self::Output> {
        remote.participant_apply(viewer, self.group_id).await
    }

    fn reconcile(
        &self,
        store: &CacheStore,
        viewer: &Identity,
        output: &Self::Output,
    ) -> Result<(), StoreError> {
        let key = roster_key(viewer, self.group_id);
        if let Some(read) = store.get::<Vec<StudyParticipant>>(&key)? {
            let mut roster = read.into_value();
            for participant in roster.iter_mut() {
                if participant.user_id == viewer.user_id {
                    *participant = output.clone();
                }
            }
            store.set(&key, &roster)?;
        }
        Ok(())
    }

    fn aggregate_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![group_key(viewer, self.group_id)]
    }
}

/// Approve or reject one participant of a group the viewer owns.
///
/// The optimistic write reclassifies exactly the named participant; every
/// other row keeps its classification through the settle cycle.
#[derive(Debug, Clone)]
pub struct SetParticipantStatus {
    group_id: GroupId,
    user_id: UserId,
    status: ParticipantStatus,
}

impl SetParticipantStatus {
    pub fn new(group_id: GroupId, user_id: UserId, status: ParticipantStatus) -> Self {
        Self {
            group_id,
            user_id,
            status,
        }
    }
}

#[async_trait]
impl OptimisticMutation for SetParticipantStatus {
    type Output = StudyParticipant;

    fn name(&self) -> &'static str {
        "study.set_status"
    }

    fn affected_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![roster_key(viewer, self.group_id)]
    }

    fn apply_optimistic(&self, store: &CacheStore, viewer: &Identity) -> Result<(), StoreError> {
        let key = roster_key(viewer, self.group_id);
        if let Some(read) = store.get::<Vec<StudyParticipant>>(&key)? {
            let mut roster = read.into_value();
            for participant in roster.iter_mut() {
                if participant.user_id == self.user_id {
                    participant.status = self.status;
                }
            }
            store.set(&key, &roster)?;
        }
        Ok(())
    }

    async fn execute(
        &self,
        remote: &dyn RemoteService,
        viewer: &Identity,
    ) -> AccessResult<Self::Output> {
        remote
            .participant_set_status(viewer, self.group_id, self.user_id, self.status)
            .await
    }

    fn reconcile(
        &self,
        store: &CacheStore,
        viewer: &Identity,
        output: &Self::Output,
    ) -> Result<(), StoreError> {
        let key = roster_key(viewer, self.group_id);
        if let Some(read) = store.get::<Vec<StudyParticipant>>(&key)? {
            let mut roster = read.into_value();
            for participant in roster.iter_mut() {
                if participant.user_id == self.user_id {
                    *participant = output.clone();
                }
            }
            store.set(&key, &roster)?;
        }
        Ok(())
    }

    fn aggregate_keys(&self, viewer: &Identity) -> Vec<ScopedKey> {
        vec![group_key(viewer, self.group_id)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyceum_core::new_entity_id;
    use std::time::Duration;

    fn setup() -> (CacheStore, Identity, GroupId) {
        (
            CacheStore::new(Duration::from_secs(60)),
            Identity::new(new_entity_id(), "민호"),
            new_entity_id(),
        )
    }

    fn pending(group_id: GroupId, name: &str) -> StudyParticipant {
        StudyParticipant {
            group_id,
            user_id: new_entity_id(),
            display_name: name.to_string(),
            status: ParticipantStatus::Pending,
            applied_at: Utc::now(),
        }
    }

    #[test]
    fn test_apply_appends_pending_row() {
        let (store, viewer, group_id) = setup();

        ApplyToGroup::new(group_id)
            .apply_optimistic(&store, &viewer)
            .expect("apply should succeed");

        let roster = store
            .get::<Vec<StudyParticipant>>(&roster_key(&viewer, group_id))
            .expect("get should succeed")
            .expect("roster should be cached")
            .into_value();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].status, ParticipantStatus::Pending);
    }

    #[test]
    fn test_set_status_touches_only_named_participant() {
        let (store, viewer, group_id) = setup();
        let p1 = pending(group_id, "지은");
        let p2 = pending(group_id, "하늘");
        store
            .set(
                &roster_key(&viewer, group_id),
                &vec![p1.clone(), p2.clone()],
            )
            .expect("set should succeed");

        SetParticipantStatus::new(group_id, p1.user_id, ParticipantStatus::Approved)
            .apply_optimistic(&store, &viewer)
            .expect("apply should succeed");

        let roster = store
            .get::<Vec<StudyParticipant>>(&roster_key(&viewer, group_id))
            .expect("get should succeed")
            .expect("roster should be cached")
            .into_value();
        let approved = roster.iter().find(|p| p.user_id == p1.user_id);
        let untouched = roster.iter().find(|p| p.user_id == p2.user_id);
        assert_eq!(
            approved.map(|p| p.status),
            Some(ParticipantStatus::Approved)
        );
        assert_eq!(
            untouched.map(|p| p.status),
            Some(ParticipantStatus::Pending)
        );
    }
}
