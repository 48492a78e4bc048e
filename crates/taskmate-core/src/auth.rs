//! Bearer credential storage.
//!
//! Holds the authentication credential that authorizes every gateway call.
//! The store is an explicitly constructed instance shared via `Arc` — there
//! is no ambient singleton. Lifecycle: the token is set on sign-in, cleared
//! on sign-out, and invalidated when a gateway observes a 401-class
//! response.

use crate::error::{Result, TaskmateError};
use tokio::sync::{RwLock, watch};

/// Shared holder for the persisted bearer credential.
///
/// Gateways call [`CredentialStore::bearer_token`] before attempting any
/// network call; when no credential is present the call fails client-side
/// with [`TaskmateError::AuthRequired`] and no request is issued.
///
/// # Security Note
///
/// The token is never logged; log lines record only presence transitions.
pub struct CredentialStore {
    token: RwLock<Option<String>>,
    /// Signed-in flag observed by the UI to drive the forced sign-out flow.
    signed_in: watch::Sender<bool>,
}

impl CredentialStore {
    /// Creates an empty store with no credential.
    pub fn new() -> Self {
        let (signed_in, _) = watch::channel(false);
        Self {
            token: RwLock::new(None),
            signed_in,
        }
    }

    /// Stores the bearer credential (sign-in).
    pub async fn set_token(&self, token: impl Into<String>) {
        let mut slot = self.token.write().await;
        *slot = Some(token.into());
        drop(slot);
        let _ = self.signed_in.send(true);
        tracing::debug!("[CredentialStore] credential stored");
    }

    /// Discards the credential (sign-out / teardown).
    pub async fn clear(&self) {
        let mut slot = self.token.write().await;
        *slot = None;
        drop(slot);
        let _ = self.signed_in.send(false);
        tracing::debug!("[CredentialStore] credential cleared");
    }

    /// Invalidates the credential after a 401-class gateway response.
    ///
    /// Identical to [`CredentialStore::clear`] except that it records the
    /// forced nature of the sign-out.
    pub async fn invalidate(&self) {
        tracing::warn!("[CredentialStore] credential rejected by the server, forcing sign-out");
        self.clear().await;
    }

    /// Returns the stored bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`TaskmateError::AuthRequired`] when no credential is stored.
    pub async fn bearer_token(&self) -> Result<String> {
        let token = self.token.read().await;
        token.clone().ok_or(TaskmateError::AuthRequired)
    }

    /// Returns `true` when a credential is currently stored.
    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Subscribes to the signed-in flag.
    ///
    /// The receiver yields `false` whenever the credential is cleared or
    /// invalidated, which is the UI's cue to run its sign-out flow.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.signed_in.subscribe()
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bearer_token_requires_credential() {
        let store = CredentialStore::new();

        let err = store.bearer_token().await.unwrap_err();
        assert!(err.is_auth_required());

        store.set_token("secret").await;
        assert_eq!(store.bearer_token().await.unwrap(), "secret");
    }

    #[tokio::test]
    async fn test_invalidate_notifies_subscribers() {
        let store = CredentialStore::new();
        let mut signed_in = store.subscribe();

        store.set_token("secret").await;
        signed_in.changed().await.unwrap();
        assert!(*signed_in.borrow_and_update());

        store.invalidate().await;
        signed_in.changed().await.unwrap();
        assert!(!*signed_in.borrow_and_update());
        assert!(!store.is_authenticated().await);
    }
}
