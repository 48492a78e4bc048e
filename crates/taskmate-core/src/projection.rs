//! View projection.
//!
//! Derives the filtered, sorted, display-ready task sequence from a task
//! snapshot and the caller-owned filter/search criteria. This is a pure
//! derivation: it owns no state, never mutates its input, and is idempotent
//! and order-stable for identical inputs.

use crate::task::Task;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The active filter tag of the task view.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    /// Show every task.
    #[default]
    All,
    /// Show only completed tasks.
    Completed,
}

/// Projects a task snapshot into its display order.
///
/// - Filters by case-insensitive substring match of `search` against the
///   title.
/// - `TaskFilter::Completed` additionally requires the completion flag;
///   `TaskFilter::All` applies no completion filtering.
/// - Orders incomplete tasks before completed ones, then by creation
///   timestamp descending within each partition. The sort is stable, so
///   ties keep their original insertion order.
pub fn project(tasks: &[Task], filter: TaskFilter, search: &str) -> Vec<Task> {
    let needle = search.to_lowercase();
    let mut selected: Vec<Task> = tasks
        .iter()
        .filter(|task| {
            let matches_search = task.title.to_lowercase().contains(&needle);
            match filter {
                TaskFilter::All => matches_search,
                TaskFilter::Completed => task.completed && matches_search,
            }
        })
        .cloned()
        .collect();
    selected.sort_by_key(|task| (task.completed, std::cmp::Reverse(task.created_at)));
    selected
}

/// Counts the tasks still open in a snapshot (dashboard header figure).
pub fn remaining_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|task| !task.completed).count()
}
