//! Task domain model.
//!
//! This module contains the core Task entity and the patch value object used
//! for partial updates against the remote task store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single task owned by a user.
///
/// The id is server-assigned, unique, and immutable once assigned. A task
/// with no server id never enters the authoritative local set: optimistic
/// inserts carry a unique negative provisional id and are replaced wholesale
/// by the confirmed server task, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned identifier. Negative while provisional.
    pub id: i64,
    /// Identifier of the owning user.
    pub user_id: i64,
    /// Task title (non-empty, caller-validated).
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Completion flag.
    pub completed: bool,
    /// Timestamp when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp when the task was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Returns `true` while the task carries a provisional (not yet
    /// server-confirmed) identity.
    pub fn is_provisional(&self) -> bool {
        self.id < 0
    }
}

/// A partial update for a task, mirroring the remote update operation.
///
/// Fields left as `None` are omitted from the request and keep their
/// current server-side value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Creates a patch that rewrites the title and description.
    pub fn edit(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: Some(title.into()),
            description,
            completed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provisional_identity() {
        let now = Utc::now();
        let task = Task {
            id: -1,
            user_id: 7,
            title: "Buy milk".to_string(),
            description: None,
            completed: false,
            created_at: now,
            updated_at: now,
        };

        assert!(task.is_provisional());
        assert!(!Task { id: 1, ..task }.is_provisional());
    }

    #[test]
    fn test_patch_omits_unset_fields() {
        let patch = TaskPatch::edit("Pay rent", None);
        let json = serde_json::to_value(&patch).unwrap();

        assert_eq!(json["title"], "Pay rent");
        assert!(json.get("description").is_none());
        assert!(json.get("completed").is_none());
    }
}
