use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;

/// Identifier of an authenticated user. Scopes the history store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
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
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Source of the signed-in identity.
///
/// Absence of an identity disables history; citations keep working locally.
pub trait IdentityProvider: Send + Sync {
    fn current_identity(&self) -> Option<UserId>;

    fn is_authorized(&self) -> bool {
        self.current_identity().is_some()
    }

    fn sign_out(&self);
}

/// In-process identity provider whose changes can be observed.
pub struct LocalIdentity {
    current: watch::Sender<Option<UserId>>,
}

impl LocalIdentity {
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            current: watch::Sender::new(None),
        }
    }

    #[must_use]
    pub fn signed_in(user: UserId) -> Self {
        Self {
            current: watch::Sender::new(Some(user)),
        }
    }

    pub fn sign_in(&self, user: UserId) {
        tracing::debug!(user = %user, "identity signed in");
        self.current.send_replace(Some(user));
    }

    /// Observe identity changes. The receiver starts at the current value.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Option<UserId>> {
        self.current.subscribe()
    }
}

impl Default for LocalIdentity {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl IdentityProvider for LocalIdentity {
    fn current_identity(&self) -> Option<UserId> {
        self.current.borrow().clone()
    }

    fn sign_out(&self) {
        tracing::debug!("identity signed out");
        self.current.send_replace(None);
    }
}
