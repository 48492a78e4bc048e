//! HTTP implementation of the conversation gateway.
//!
//! Talks to the backend chat endpoint: `POST /api/{user}/chat` with
//! `{ message, conversation_id? }`, answered by
//! `{ conversation_id, response, tool_calls }`.

use crate::config::GatewayConfig;
use crate::http::{self, Channel};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use taskmate_core::auth::CredentialStore;
use taskmate_core::error::Result;
use taskmate_core::session::{ChatGateway, ChatReply, ToolCall};

/// Gateway to the remote conversational endpoint over HTTP.
pub struct HttpChatGateway {
    client: Client,
    base_url: String,
    credential: Arc<CredentialStore>,
}

impl HttpChatGateway {
    /// Creates a gateway with the given configuration and credential store.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the underlying HTTP client cannot be built.
    pub fn new(config: &GatewayConfig, credential: Arc<CredentialStore>) -> Result<Self> {
        Ok(Self {
            client: http::build_client(config.timeout)?,
            base_url: config.base_url.clone(),
            credential,
        })
    }
}

#[async_trait]
impl ChatGateway for HttpChatGateway {
    async fn send(
        &self,
        user_id: i64,
        message: &str,
        conversation_id: Option<i64>,
    ) -> Result<ChatReply> {
        let token = self.credential.bearer_token().await?;
        let url = format!("{}/api/{}/chat", self.base_url, user_id);
        let response = self
            .client
            .post(url)
            .bearer_auth(&token)
            .json(&ChatRequest {
                message,
                conversation_id,
            })
            .send()
            .await
            .map_err(|err| http::transport_error(Channel::Write, err))?;
        let response = http::require_success(Channel::Write, response, &self.credential).await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| Channel::Write.error(format!("failed to parse chat reply: {err}")))?;
        tracing::debug!(
            "[HttpChatGateway] reply for conversation {} ({} tool calls)",
            parsed.conversation_id,
            parsed.tool_calls.len()
        );
        Ok(parsed.into_reply())
    }
}

/// Wire shape of the chat request body.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<i64>,
}

/// Wire shape of the chat response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    conversation_id: i64,
    response: String,
    #[serde(default)]
    tool_calls: Vec<ToolCallRecord>,
}

/// Wire shape of one tool invocation record.
#[derive(Debug, Deserialize)]
struct ToolCallRecord {
    tool_name: String,
    #[serde(default)]
    inputs: serde_json::Value,
    #[serde(default)]
    output: serde_json::Value,
}

impl ChatResponse {
    fn into_reply(self) -> ChatReply {
        ChatReply {
            conversation_id: self.conversation_id,
            reply: self.response,
            tool_calls: self
                .tool_calls
                .into_iter()
                .map(|record| ToolCall {
                    name: record.tool_name,
                    inputs: record.inputs,
                    output: record.output,
                })
                .collect(),
        }
    }
}
