//! Conversation gateway trait.
//!
//! Defines the interface to the remote conversational endpoint.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A structured record of an action the remote assistant performed
/// server-side on the user's behalf, returned alongside its reply.
///
/// Tool calls are informational only: the core never parses them to apply
/// mutations directly. Assistant-driven changes become visible through a
/// full task reload after the reply, keeping a single create/update/delete
/// code path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool the assistant invoked.
    pub name: String,
    /// Structured inputs the assistant passed.
    pub inputs: serde_json::Value,
    /// Structured output the tool produced.
    pub output: serde_json::Value,
}

/// The remote endpoint's response to one conversational turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Identifier of the conversation this turn belongs to. Assigned by the
    /// endpoint on the first turn and echoed back afterwards.
    pub conversation_id: i64,
    /// The assistant's natural-language reply.
    pub reply: String,
    /// Ordered record of server-side tool invocations for this turn.
    pub tool_calls: Vec<ToolCall>,
}

/// An abstract gateway to the remote conversational endpoint.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Sends one conversational turn.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user the conversation belongs to
    /// * `message` - The user's message text
    /// * `conversation_id` - `None` on the first turn of a conversation;
    ///   the id adopted from the first reply afterwards
    ///
    /// # Returns
    ///
    /// - `Ok(ChatReply)`: The reply plus the tool-call record
    /// - `Err(_)`: `AuthRequired` when no credential is stored (checked
    ///   before any network call), `Mutation` on network failure, timeout,
    ///   or a non-success response
    async fn send(
        &self,
        user_id: i64,
        message: &str,
        conversation_id: Option<i64>,
    ) -> Result<ChatReply>;
}
