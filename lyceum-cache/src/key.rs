//! Viewer-scoped cache key system.
//!
//! The key insight is that `ScopedKey`'s private constructor makes
//! cross-viewer cache access uncompilable. You cannot construct a key
//! without explicitly providing the viewer's user id.

use lyceum_core::{ResourceKind, UserId};
use uuid::Uuid;

/// Separator byte between the viewer id and the rest of the key.
const SEPARATOR: u8 = 0xFF;

/// A cache key scoped to one viewer.
///
/// # Design
///
/// The private inner struct ensures that a `ScopedKey` can ONLY be
/// constructed via [`new`](Self::new) or [`aggregate`](Self::aggregate),
/// both of which require a viewer id. Every cached query is therefore
/// isolated per account by construction.
///
/// # Binary Format
///
/// The key encodes to a fixed 34-byte array:
/// - Bytes 0-15: viewer user id (UUID as bytes)
/// - Byte 16: separator (0xFF)
/// - Byte 17: resource kind (single byte discriminant)
/// - Bytes 18-33: subject id (UUID as bytes)
///
/// Viewer-level aggregates (post feed, notification inbox, unread count,
/// bookmark batch) use the nil UUID as subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopedKey {
    inner: ScopedKeyInner,
}

/// Private inner struct - prevents external construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ScopedKeyInner {
    user_id: UserId,
    kind: ResourceKind,
    subject: Uuid,
}

impl ScopedKey {
    /// Create a key for one subject resource as seen by one viewer.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The viewer whose cached view this key addresses
    /// * `kind` - The query shape being cached
    /// * `subject` - The id of the lecture/post/course/group the query is about
    pub fn new(user_id: UserId, kind: ResourceKind, subject: Uuid) -> Self {
        Self {
            inner: ScopedKeyInner {
                user_id,
                kind,
                subject,
            },
        }
    }

    /// Create a viewer-level aggregate key (no single subject).
    ///
    /// Used for the post feed, the notification inbox, the unread counter,
    /// and the bookmark batch map.
    pub fn aggregate(user_id: UserId, kind: ResourceKind) -> Self {
        Self::new(user_id, kind, Uuid::nil())
    }

    /// Get the viewer this key is scoped to.
    pub fn user_id(&self) -> UserId {
        self.inner.user_id
    }

    /// Get the resource kind for this key.
    pub fn kind(&self) -> ResourceKind {
        self.inner.kind
    }

    /// Get the subject id for this key (nil for aggregates).
    pub fn subject(&self) -> Uuid {
        self.inner.subject
    }

    /// Encode this key to a fixed-size byte array.
    ///
    /// Format: [user_id: 16 bytes][separator: 1 byte][kind: 1 byte][subject: 16 bytes]
    /// Total: 34 bytes
    pub fn encode(&self) -> [u8; 34] {
        let mut bytes = [0u8; 34];
        bytes[0..16].copy_from_slice(self.inner.user_id.as_bytes());
        bytes[16] = SEPARATOR;
        bytes[17] = self.inner.kind.to_byte();
        bytes[18..34].copy_from_slice(self.inner.subject.as_bytes());
        bytes
    }

    /// Decode a key from bytes.
    ///
    /// Returns `None` if the slice is not exactly 34 bytes, the separator
    /// is wrong, or the kind byte is unknown.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 34 {
            return None;
        }
        if bytes[16] != SEPARATOR {
            return None;
        }
        let user_id = Uuid::from_slice(&bytes[0..16]).ok()?;
        let kind = ResourceKind::from_byte(bytes[17])?;
        let subject = Uuid::from_slice(&bytes[18..34]).ok()?;
        Some(Self::new(user_id, kind, subject))
    }

    /// True when this key belongs to the given viewer.
    pub fn is_for_viewer(&self, user_id: UserId) -> bool {
        self.inner.user_id == user_id
    }

    /// True when this key belongs to the given viewer and kind.
    ///
    /// This is the predicate shape used by kind-wide invalidation.
    pub fn matches_kind(&self, user_id: UserId, kind: ResourceKind) -> bool {
        self.inner.user_id == user_id && self.inner.kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyceum_core::new_entity_id;

    #[test]
    fn test_new_and_getters() {
        let user_id = new_entity_id();
        let subject = new_entity_id();
        let key = ScopedKey::new(user_id, ResourceKind::CommentList, subject);

        assert_eq!(key.user_id(), user_id);
        assert_eq!(key.kind(), ResourceKind::CommentList);
        assert_eq!(key.subject(), subject);
    }

    #[test]
    fn test_aggregate_uses_nil_subject() {
        let user_id = new_entity_id();
        let key = ScopedKey::aggregate(user_id, ResourceKind::UnreadCount);
        assert_eq!(key.subject(), Uuid::nil());
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let key = ScopedKey::new(new_entity_id(), ResourceKind::BookmarkStatus, new_entity_id());
        let encoded = key.encode();
        let decoded = ScopedKey::decode(&encoded).expect("decode should succeed");
        assert_eq!(key, decoded);
    }

    #[test]
    fn test_decode_wrong_length() {
        assert!(ScopedKey::decode(&[0u8; 33]).is_none());
        assert!(ScopedKey::decode(&[0u8; 35]).is_none());
    }

    #[test]
    fn test_decode_wrong_separator() {
        let key = ScopedKey::new(new_entity_id(), ResourceKind::Post, new_entity_id());
        let mut encoded = key.encode();
        encoded[16] = 0x00;
        assert!(ScopedKey::decode(&encoded).is_none());
    }

    #[test]
    fn test_decode_unknown_kind_byte() {
        let key = ScopedKey::new(new_entity_id(), ResourceKind::Post, new_entity_id());
        let mut encoded = key.encode();
        encoded[17] = 255;
        assert!(ScopedKey::decode(&encoded).is_none());
    }

    #[test]
    fn test_different_viewers_different_keys() {
        let subject = new_entity_id();
        let key1 = ScopedKey::new(new_entity_id(), ResourceKind::CourseProgress, subject);
        let key2 = ScopedKey::new(new_entity_id(), ResourceKind::CourseProgress, subject);
        assert_ne!(key1.encode(), key2.encode());
    }

    #[test]
    fn test_matches_kind() {
        let user_id = new_entity_id();
        let key = ScopedKey::new(user_id, ResourceKind::ReviewList, new_entity_id());

        assert!(key.matches_kind(user_id, ResourceKind::ReviewList));
        assert!(!key.matches_kind(user_id, ResourceKind::CommentList));
        assert!(!key.matches_kind(new_entity_id(), ResourceKind::ReviewList));
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn uuid_strategy() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    fn kind_strategy() -> impl Strategy<Value = ResourceKind> {
        (0u8..14).prop_map(|b| ResourceKind::from_byte(b).expect("valid kind byte"))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// Encode/decode roundtrip preserves the original key.
        #[test]
        fn prop_encode_decode_roundtrip(
            user_id in uuid_strategy(),
            kind in kind_strategy(),
            subject in uuid_strategy(),
        ) {
            let key = ScopedKey::new(user_id, kind, subject);
            let decoded = ScopedKey::decode(&key.encode());
            prop_assert_eq!(decoded, Some(key));
        }

        /// Encoding is injective: distinct keys never collide.
        #[test]
        fn prop_encoding_is_injective(
            user1 in uuid_strategy(),
            user2 in uuid_strategy(),
            kind1 in kind_strategy(),
            kind2 in kind_strategy(),
            subject1 in uuid_strategy(),
            subject2 in uuid_strategy(),
        ) {
            let key1 = ScopedKey::new(user1, kind1, subject1);
            let key2 = ScopedKey::new(user2, kind2, subject2);

            if key1 == key2 {
                prop_assert_eq!(key1.encode(), key2.encode());
            } else {
                prop_assert_ne!(key1.encode(), key2.encode());
            }
        }

        /// The viewer id occupies the first 16 bytes.
        #[test]
        fn prop_viewer_id_extractable(
            user_id in uuid_strategy(),
            kind in kind_strategy(),
            subject in uuid_strategy(),
        ) {
            let key = ScopedKey::new(user_id, kind, subject);
            let encoded = key.encode();
            let extracted = Uuid::from_slice(&encoded[0..16]).expect("UUID extraction should succeed");
            prop_assert_eq!(user_id, extracted);
        }
    }
}
