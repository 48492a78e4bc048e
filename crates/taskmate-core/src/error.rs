//! Error types for the Taskmate client core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the Taskmate client.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. Every operation in the core
/// either returns a confirmed new state or one of these variants with the
/// prior state intact; failures are never swallowed.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum TaskmateError {
    /// No credential is stored. The operation was refused client-side before
    /// any network call; triggers the sign-out flow.
    #[error("Authentication required")]
    AuthRequired,

    /// A read from a remote gateway failed (network, timeout, or a
    /// non-success response). Prior local state is preserved.
    #[error("Fetch failed: {message}")]
    Fetch { message: String },

    /// A write to a remote gateway failed. Any optimistic local change has
    /// been rolled back before this is returned.
    #[error("Mutation failed: {message}")]
    Mutation { message: String },

    /// A second conversational send was attempted while one was in flight.
    /// Rejected synchronously, no state change.
    #[error("A message is already being sent")]
    ConcurrentSend,

    /// Entity not found with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Input failed a precondition (empty title, blank chat message)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", etc.
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskmateError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Fetch error
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Creates a Mutation error
    pub fn mutation(message: impl Into<String>) -> Self {
        Self::Mutation {
            message: message.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an AuthRequired error
    pub fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthRequired)
    }

    /// Check if this is a Fetch error
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }

    /// Check if this is a Mutation error
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Mutation { .. })
    }

    /// Check if this is a ConcurrentSend error
    pub fn is_concurrent_send(&self) -> bool {
        matches!(self, Self::ConcurrentSend)
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an InvalidInput error
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<serde_json::Error> for TaskmateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (transitional, should be removed eventually)
impl From<anyhow::Error> for TaskmateError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Conversion from String (for error messages)
impl From<String> for TaskmateError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, TaskmateError>`.
pub type Result<T> = std::result::Result<T, TaskmateError>;
