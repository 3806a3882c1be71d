//! Error types for LYCEUM operations

use crate::enums::ResourceKind;
use thiserror::Error;
use uuid::Uuid;

/// Failures surfaced by the remote accessor boundary.
///
/// Accessors return these unchanged; the mutation engine rolls back and
/// re-returns them, and the UI renders [`user_message`](Self::user_message).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("no active session")]
    AuthenticationRequired,

    #[error("permission denied: {action} on {resource}")]
    AuthorizationDenied { action: String, resource: String },

    #[error("{kind:?} not found: {id}")]
    NotFound { kind: ResourceKind, id: Uuid },

    #[error("conflict: {reason}")]
    Conflict { reason: String },

    #[error("transport failure: {reason}")]
    Transport { reason: String },
}

impl AccessError {
    /// Permission failure for a named action on a named resource.
    pub fn denied(action: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::AuthorizationDenied {
            action: action.into(),
            resource: resource.into(),
        }
    }

    /// Missing-row failure for one resource kind.
    pub fn not_found(kind: ResourceKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }

    /// Uniqueness or already-in-desired-state failure.
    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    /// Network or service availability failure.
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Short human-readable message shown by the UI.
    ///
    /// These are the platform's canonical Korean UI strings. Every failure
    /// maps to exactly one; the transport message is the generic
    /// retry-suggesting fallback.
    pub fn user_message(&self) -> &'static str {
        match self {
            AccessError::AuthenticationRequired => "로그인이 필요합니다",
            AccessError::AuthorizationDenied { .. } => "권한이 없습니다",
            AccessError::NotFound { .. } => "대상을 찾을 수 없습니다",
            AccessError::Conflict { .. } => "이미 처리된 요청입니다",
            AccessError::Transport { .. } => "처리에 실패했습니다",
        }
    }
}

/// Cache store failures. These are local faults, not remote ones.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("cache codec error: {reason}")]
    Codec { reason: String },
}

impl StoreError {
    /// Serialization or deserialization failure for a cached value.
    pub fn codec(reason: impl std::fmt::Display) -> Self {
        Self::Codec {
            reason: reason.to_string(),
        }
    }
}

/// Realtime change feed failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    #[error("change feed closed")]
    Closed,

    #[error("change feed buffer full")]
    Saturated,
}

/// Master error type for all LYCEUM errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LyceumError {
    #[error("access error: {0}")]
    Access(#[from] AccessError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("feed error: {0}")]
    Feed(#[from] FeedError),
}

impl LyceumError {
    /// Short human-readable message shown by the UI.
    ///
    /// Local store and feed faults collapse into the generic failure
    /// message; only accessor failures get distinct wording.
    pub fn user_message(&self) -> &'static str {
        match self {
            LyceumError::Access(err) => err.user_message(),
            LyceumError::Store(_) | LyceumError::Feed(_) => "처리에 실패했습니다",
        }
    }
}

/// Result alias for accessor calls.
pub type AccessResult<T> = Result<T, AccessError>;

/// Result alias for LYCEUM operations.
pub type LyceumResult<T> = Result<T, LyceumError>;
