//! Conversation turn-taking.
//!
//! `ChatSession` owns a single logical conversation: its identity, its
//! ordered message log, and the strictly serialized send state machine
//! (`Idle → Sending → Idle | Idle-with-Error`). Assistant replies are
//! translated into task-store refreshes rather than parsed tool-by-tool.

use super::gateway::ChatGateway;
use super::model::ChatMessage;
use super::quick_action::QuickAction;
use crate::auth::CredentialStore;
use crate::error::{Result, TaskmateError};
use crate::task::TaskStore;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Greeting seeded into every fresh session. Not persisted server-side.
pub const GREETING: &str = "Hi! I'm your task assistant. I can help you add, view, update, and manage your tasks. What would you like to do?";

/// Synthetic assistant reply appended when a turn fails, so the log always
/// shows a reply to every sent user message.
pub const FAILURE_REPLY: &str = "Sorry, I encountered an error. Please try again.";

struct ChatState {
    /// Conversation identifier, adopted from the first successful reply.
    conversation_id: Option<i64>,
    /// Ordered message log, greeting first.
    messages: Vec<ChatMessage>,
    /// A turn is in flight; the composer must be disabled.
    sending: bool,
    /// Last transient error, shown as a dismissible indicator.
    last_error: Option<String>,
    /// Bumped on reset so stale in-flight replies can be detected.
    generation: u64,
}

impl ChatState {
    fn fresh(generation: u64) -> Self {
        Self {
            conversation_id: None,
            messages: vec![ChatMessage::assistant(GREETING)],
            sending: false,
            last_error: None,
            generation,
        }
    }
}

/// A single logical conversation with the remote assistant.
///
/// `ChatSession` is responsible for:
/// - Serializing conversational turns (at most one request in flight)
/// - Owning the message log and the conversation identity
/// - Refreshing the task store after each reply so server-side tool-driven
///   mutations become visible
///
/// The session is created when the chat surface opens and discarded when it
/// closes; there is no cross-session resumption.
pub struct ChatSession {
    gateway: Arc<dyn ChatGateway>,
    store: Arc<TaskStore>,
    credential: Arc<CredentialStore>,
    state: Mutex<ChatState>,
}

impl ChatSession {
    /// Creates a fresh session seeded with the assistant greeting.
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        store: Arc<TaskStore>,
        credential: Arc<CredentialStore>,
    ) -> Self {
        Self {
            gateway,
            store,
            credential,
            state: Mutex::new(ChatState::fresh(0)),
        }
    }

    /// Sends one conversational turn.
    ///
    /// The user message is appended immediately and never rolled back: the
    /// log must show what was actually sent even if the reply fails. On
    /// success the assistant reply is appended and the task store is
    /// reloaded so assistant-driven mutations become visible; the returned
    /// tool-call record is informational only and is never parsed into
    /// direct mutations. On failure a synthetic assistant reply is appended
    /// and the error is recorded for transient display.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when the trimmed content is empty (no state change)
    /// - `AuthRequired` when no credential is stored (checked before the
    ///   user message is appended; nothing was sent)
    /// - `ConcurrentSend` when a turn is already in flight (no duplicate
    ///   user message is appended)
    /// - `Mutation` when the gateway call fails
    /// - `Fetch` when the reply arrived but the follow-up task reload failed
    pub async fn send(&self, user_id: i64, content: impl Into<String>) -> Result<()> {
        let content = content.into();
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(TaskmateError::invalid_input("message must not be empty"));
        }
        // The chat surface must not attempt a send without a credential.
        self.credential.bearer_token().await?;

        let (generation, conversation_id) = {
            let mut state = self.state.lock().await;
            if state.sending {
                return Err(TaskmateError::ConcurrentSend);
            }
            state.sending = true;
            state.last_error = None;
            state.messages.push(ChatMessage::user(trimmed));
            (state.generation, state.conversation_id)
        };

        tracing::debug!(
            "[ChatSession] sending turn (conversation_id: {:?})",
            conversation_id
        );
        let outcome = self.gateway.send(user_id, trimmed, conversation_id).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            // The surface was closed while the request was in flight; the
            // response belongs to a discarded session.
            tracing::debug!("[ChatSession] dropping reply for stale generation {}", generation);
            return Ok(());
        }

        match outcome {
            Ok(reply) => {
                if state.conversation_id.is_none() {
                    state.conversation_id = Some(reply.conversation_id);
                }
                tracing::debug!(
                    "[ChatSession] reply received ({} tool calls)",
                    reply.tool_calls.len()
                );
                state.messages.push(ChatMessage::assistant(reply.reply));
                state.sending = false;
                drop(state);

                // Server-side tool mutations become visible through a full
                // reload, never by replaying the tool-call record.
                if let Err(err) = self.store.load(user_id).await {
                    tracing::warn!("[ChatSession] task reload after reply failed: {}", err);
                    let mut state = self.state.lock().await;
                    if state.generation == generation {
                        state.last_error = Some(err.to_string());
                    }
                    return Err(err);
                }
                Ok(())
            }
            Err(err) => {
                state.messages.push(ChatMessage::assistant(FAILURE_REPLY));
                state.last_error = Some(err.to_string());
                state.sending = false;
                Err(err)
            }
        }
    }

    /// Sends a quick action's canned message through the ordinary turn.
    pub async fn send_quick_action(&self, user_id: i64, action: &QuickAction) -> Result<()> {
        self.send(user_id, action.message).await
    }

    /// Discards the conversation and reseeds the greeting.
    ///
    /// Called when the chat surface is closed and reopened. Any reply still
    /// in flight for the previous conversation observes the bumped
    /// generation and is dropped without touching state.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        let generation = state.generation + 1;
        *state = ChatState::fresh(generation);
    }

    /// Returns a snapshot of the ordered message log.
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.state.lock().await.messages.clone()
    }

    /// Returns the conversation id, `None` before the first reply.
    pub async fn conversation_id(&self) -> Option<i64> {
        self.state.lock().await.conversation_id
    }

    /// Returns `true` while a turn is in flight (composer contract).
    pub async fn is_pending(&self) -> bool {
        self.state.lock().await.sending
    }

    /// Returns the last transient error, if one is displayed.
    pub async fn last_error(&self) -> Option<String> {
        self.state.lock().await.last_error.clone()
    }

    /// Dismisses the transient error indicator.
    pub async fn dismiss_error(&self) {
        self.state.lock().await.last_error = None;
    }
}
