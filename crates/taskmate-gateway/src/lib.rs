//! HTTP gateway implementations for the Taskmate client core.
//!
//! Provides [`HttpTaskGateway`] and [`HttpChatGateway`], reqwest-backed
//! implementations of the core's gateway traits, plus [`GatewayConfig`] for
//! endpoint and timeout configuration. Every call carries the bearer
//! credential from the shared [`taskmate_core::auth::CredentialStore`]; a
//! missing credential fails client-side before any network I/O, and a
//! 401-class response invalidates the credential to force sign-out.

pub mod chat;
pub mod config;
mod http;
pub mod tasks;

pub use chat::HttpChatGateway;
pub use config::GatewayConfig;
pub use tasks::HttpTaskGateway;
