//! Client composition root.
//!
//! `TaskmateClient` wires the credential store, task store, and chat surface
//! together with an explicit lifecycle: construct with injected gateways,
//! `sign_in` to populate, `sign_out` to tear down. There are no ambient
//! singletons; the UI owns exactly one instance and passes it down.

use crate::auth::CredentialStore;
use crate::error::Result;
use crate::session::{ChatGateway, ChatSession};
use crate::task::{TaskGateway, TaskStore};
use std::sync::Arc;

/// The explicitly constructed client context.
pub struct TaskmateClient {
    credential: Arc<CredentialStore>,
    store: Arc<TaskStore>,
    chat_gateway: Arc<dyn ChatGateway>,
}

impl TaskmateClient {
    /// Wires a client from its gateway dependencies.
    pub fn new(
        task_gateway: Arc<dyn TaskGateway>,
        chat_gateway: Arc<dyn ChatGateway>,
        credential: Arc<CredentialStore>,
    ) -> Self {
        Self {
            credential,
            store: Arc::new(TaskStore::new(task_gateway)),
            chat_gateway,
        }
    }

    /// Returns the shared task store.
    pub fn store(&self) -> Arc<TaskStore> {
        self.store.clone()
    }

    /// Returns the shared credential store.
    pub fn credential(&self) -> Arc<CredentialStore> {
        self.credential.clone()
    }

    /// Stores the credential and performs the initial task load.
    ///
    /// # Errors
    ///
    /// Returns `Fetch` when the initial load fails; the credential stays in
    /// place so the caller may retry the load.
    pub async fn sign_in(&self, user_id: i64, token: impl Into<String>) -> Result<()> {
        self.credential.set_token(token).await;
        self.store.load(user_id).await
    }

    /// Opens a fresh chat surface.
    ///
    /// Each open constructs a new [`ChatSession`]; the previous surface's
    /// conversation id and log are discarded with it (no cross-session
    /// resumption).
    pub fn open_chat(&self) -> ChatSession {
        ChatSession::new(
            self.chat_gateway.clone(),
            self.store.clone(),
            self.credential.clone(),
        )
    }

    /// Tears the client down on sign-out.
    ///
    /// Clears the credential and discards the local task set.
    pub async fn sign_out(&self) {
        self.credential.clear().await;
        self.store.clear().await;
        tracing::info!("[TaskmateClient] signed out, local state discarded");
    }
}
