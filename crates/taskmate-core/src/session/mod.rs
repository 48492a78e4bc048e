//! Conversation session domain module.
//!
//! This module contains the conversation message types, the gateway
//! interface to the remote conversational endpoint, the quick-action
//! shortcuts, and the session itself.
//!
//! # Module Structure
//!
//! - `model`: Message types (`MessageRole`, `ChatMessage`)
//! - `gateway`: Gateway trait and reply types (`ChatGateway`, `ChatReply`, `ToolCall`)
//! - `chat`: Conversation turn-taking (`ChatSession`)
//! - `quick_action`: Canned conversational shortcuts (`QuickAction`)
//!
//! # Usage
//!
//! ```ignore
//! use taskmate_core::session::{ChatSession, ChatGateway, ChatMessage, MessageRole};
//! use taskmate_core::session::QuickAction;
//! ```

mod chat;
pub mod gateway;
mod model;
mod quick_action;

// Re-export public API
pub use chat::{ChatSession, FAILURE_REPLY, GREETING};
pub use gateway::{ChatGateway, ChatReply, ToolCall};
pub use model::{ChatMessage, MessageRole};
pub use quick_action::QuickAction;
