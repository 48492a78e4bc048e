//! Task gateway trait.
//!
//! Defines the interface to the remote task store.

use super::model::{Task, TaskPatch};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract gateway to the remote task store.
///
/// This trait defines the contract for the request/response calls the local
/// task mirror reconciles against, decoupling the core from the specific
/// transport (HTTP in production, in-memory mocks in tests).
///
/// # Implementation Notes
///
/// Implementations should:
/// - Carry the bearer credential on every call and fail client-side with
///   `AuthRequired` when none is stored
/// - Invalidate the credential on a 401-class response
/// - Apply a bounded request timeout; a timeout fails exactly like a
///   rejected request
#[async_trait]
pub trait TaskGateway: Send + Sync {
    /// Lists all tasks for a user.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The owning user
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Task>)`: The user's full task set
    /// - `Err(_)`: `Fetch` on failure
    async fn list(&self, user_id: i64) -> Result<Vec<Task>>;

    /// Creates a new task.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The owning user
    /// * `title` - Task title (non-empty)
    /// * `description` - Optional description
    ///
    /// # Returns
    ///
    /// - `Ok(Task)`: The server-confirmed task with its assigned id
    /// - `Err(_)`: `Mutation` on failure
    async fn create(&self, user_id: i64, title: &str, description: Option<&str>) -> Result<Task>;

    /// Applies a partial update to a task.
    ///
    /// # Returns
    ///
    /// - `Ok(Task)`: The server-confirmed updated task
    /// - `Err(_)`: `Mutation` on failure
    async fn update(&self, user_id: i64, task_id: i64, patch: TaskPatch) -> Result<Task>;

    /// Deletes a task.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Task deleted remotely
    /// - `Err(_)`: `Mutation` on failure
    async fn delete(&self, user_id: i64, task_id: i64) -> Result<()>;

    /// Toggles the completion flag of a task.
    ///
    /// # Returns
    ///
    /// - `Ok(Task)`: The server-confirmed task with the flag flipped
    /// - `Err(_)`: `Mutation` on failure
    async fn toggle(&self, user_id: i64, task_id: i64) -> Result<Task>;
}
