//! User identity for gating remote sync.
//!
//! Progress works fully offline: the store mutates and persists locally
//! with or without a signed-in user. An [`IdentityProvider`] decides
//! whether remote reconciliation happens at all - when it returns `None`,
//! zero remote calls are made.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier for an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a user id from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The underlying string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Access to the current authenticated identity.
pub trait IdentityProvider: Send + Sync {
    /// The current user, or `None` when signed out.
    fn current_user(&self) -> Option<UserId>;
}

/// Fixed identity, for tests and single-user embeddings.
#[derive(Debug, Clone)]
pub struct StaticIdentity(pub UserId);

impl StaticIdentity {
    /// Create a provider that always reports the given user.
    pub fn new(user: impl Into<UserId>) -> Self {
        Self(user.into())
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserId> {
        Some(self.0.clone())
    }
}

/// No identity; remote sync becomes a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl IdentityProvider for Anonymous {
    fn current_user(&self) -> Option<UserId> {
        None
    }
}
