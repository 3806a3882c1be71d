//! Session identity boundary.
//!
//! The data layer only ever asks one question of the auth system: is there
//! a current authenticated identity, and what is its id? Everything else
//! (token refresh, OAuth flows) lives outside this workspace.

use lyceum_core::{AccessError, AccessResult, UserId};
use std::sync::RwLock;

/// The authenticated account a session acts as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub display_name: String,
}

impl Identity {
    /// Create an identity for the given account.
    pub fn new(user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }

    /// The signed-out placeholder identity (nil user id).
    ///
    /// Used to scope cache keys for reads that do not require a session.
    pub fn anonymous() -> Self {
        Self {
            user_id: UserId::nil(),
            display_name: String::new(),
        }
    }

    /// True for the signed-out placeholder.
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_nil()
    }
}

/// Answers "who is signed in right now".
///
/// Implementations must be cheap to call; the engine consults this before
/// every authenticated mutation.
pub trait SessionProvider: Send + Sync {
    /// The current identity, or `None` when signed out.
    fn current_identity(&self) -> Option<Identity>;
}

/// Resolve the current identity or fail fast.
///
/// This is the no-auth short circuit: it runs before any cache write, so a
/// signed-out mutation leaves the cache untouched.
pub fn require_identity(session: &dyn SessionProvider) -> AccessResult<Identity> {
    session
        .current_identity()
        .ok_or(AccessError::AuthenticationRequired)
}

/// Session provider with a settable identity.
///
/// Used by tests and local development; sign-in state can be swapped at
/// runtime to exercise both sides of the auth short circuit.
#[derive(Debug, Default)]
pub struct StaticSession {
    identity: RwLock<Option<Identity>>,
}

impl StaticSession {
    /// Start signed out.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Start signed in as the given identity.
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: RwLock::new(Some(identity)),
        }
    }

    /// Swap in a signed-in identity.
    pub fn sign_in(&self, identity: Identity) {
        if let Ok(mut slot) = self.identity.write() {
            *slot = Some(identity);
        }
    }

    /// Clear the session.
    pub fn sign_out(&self) {
        if let Ok(mut slot) = self.identity.write() {
            *slot = None;
        }
    }
}

impl SessionProvider for StaticSession {
    fn current_identity(&self) -> Option<Identity> {
        self.identity.read().ok().and_then(|slot| slot.clone())
    }
}
