//! worklog-chat: conversation state and streamed-reply reconciliation
//!
//! This crate owns the conversation transcript and the turn state machine,
//! and reconciles the chat endpoint's event stream against them: deltas are
//! appended in arrival order, terminal events finalize the reply, and
//! events from superseded turns are discarded by generation.

pub mod chat;
pub mod conversation;
pub mod error;
pub mod events;
pub mod transport;

pub use chat::{Chat, TurnHandle};
pub use conversation::{ChatMessage, Conversation, ERROR_MARKER, Role, TurnPhase};
pub use error::{Error, Result};
pub use events::ChatUpdate;
pub use transport::{ChatTransport, HttpTransport};
