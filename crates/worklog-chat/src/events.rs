//! Updates broadcast to whatever is displaying the conversation

use serde::{Deserialize, Serialize};

/// Events emitted while a conversation changes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatUpdate {
    /// A turn started producing
    TurnStart { generation: u64 },

    /// A fragment was appended to the in-progress reply
    Delta { generation: u64, content: String },

    /// The turn finished normally
    TurnEnd { generation: u64 },

    /// The turn failed; `message` is the user-visible reason, shown both in
    /// the replaced reply and as a transient notice
    TurnFailed { generation: u64, message: String },

    /// The conversation was cleared and reassigned a session id
    Reset { session_id: String },
}

impl ChatUpdate {
    /// Check if this update ends a turn
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ChatUpdate::TurnEnd { .. } | ChatUpdate::TurnFailed { .. }
        )
    }
}
