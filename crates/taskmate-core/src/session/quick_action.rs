//! Quick-action shortcuts for the chat surface.

/// A canned conversational shortcut.
///
/// Quick actions are pure conveniences: selecting one sends its message
/// through the ordinary conversational turn, and they carry no state of
/// their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAction {
    /// Stable identifier for the action.
    pub id: &'static str,
    /// Short label for display.
    pub label: &'static str,
    /// The message sent when the action is selected.
    pub message: &'static str,
}

/// Default quick actions offered on the chat surface.
const DEFAULT_QUICK_ACTIONS: [QuickAction; 3] = [
    QuickAction {
        id: "add",
        label: "Add task",
        message: "I want to add a new task",
    },
    QuickAction {
        id: "pending",
        label: "Show pending",
        message: "Show my pending tasks",
    },
    QuickAction {
        id: "completed",
        label: "Show completed",
        message: "Show my completed tasks",
    },
];

impl QuickAction {
    /// Returns the default quick actions.
    pub fn defaults() -> &'static [QuickAction] {
        &DEFAULT_QUICK_ACTIONS
    }

    /// Looks up a default action by its identifier.
    pub fn by_id(id: &str) -> Option<&'static QuickAction> {
        DEFAULT_QUICK_ACTIONS.iter().find(|a| a.id == id)
    }
}
