//! Conversation state: transcript, session identity, and turn lifecycle
//!
//! All mutation goes through generation-checked transitions. Every turn is
//! tagged with a generation number; events carrying a stale generation (a
//! turn that was superseded by a reset) are dropped instead of applied.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix marking a reply that was replaced by a failure reason
pub const ERROR_MARKER: &str = "⚠";

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Lifecycle of the current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnPhase {
    /// No reply in flight; a new turn may start
    #[default]
    Idle,
    /// A reply is being assembled from incoming deltas
    Producing,
}

/// The conversation transcript and its turn state machine.
///
/// Fields are private: the only mutations are the guarded transitions below,
/// which keeps the invariants (append-only transcript, at most one
/// in-progress assistant message, generation-checked application) in one
/// place and testable without any networking.
#[derive(Debug)]
pub struct Conversation {
    session_id: String,
    messages: Vec<ChatMessage>,
    phase: TurnPhase,
    generation: u64,
    /// Whether the server already reassigned the session id this turn
    session_adopted: bool,
    /// Whether any content delta was applied this turn
    deltas_seen: bool,
}

impl Conversation {
    /// Create an empty conversation with a freshly minted session id
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
            phase: TurnPhase::Idle,
            generation: 0,
            session_adopted: false,
            deltas_seen: false,
        }
    }

    /// The current session id
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The transcript, in conversation order
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether a reply is currently being produced
    pub fn is_producing(&self) -> bool {
        self.phase == TurnPhase::Producing
    }

    /// The generation of the most recently started turn
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `generation` identifies the live, producing turn
    fn is_live(&self, generation: u64) -> bool {
        self.phase == TurnPhase::Producing && generation == self.generation
    }

    /// Begin a turn: append the user message and an empty assistant
    /// placeholder, flip to `Producing`, and mint the turn's generation.
    ///
    /// Callers must check [`is_producing`](Self::is_producing) first; this
    /// is the `Idle -> Producing` edge only.
    pub(crate) fn begin_turn(&mut self, question: &str) -> u64 {
        debug_assert_eq!(self.phase, TurnPhase::Idle);

        self.generation += 1;
        self.phase = TurnPhase::Producing;
        self.session_adopted = false;
        self.deltas_seen = false;
        self.messages.push(ChatMessage::user(question));
        self.messages.push(ChatMessage::assistant(""));
        self.generation
    }

    /// Adopt a server-assigned session id. Accepted at most once per turn,
    /// and never once deltas have been applied.
    pub(crate) fn adopt_session(&mut self, generation: u64, session_id: String) {
        if !self.is_live(generation) {
            tracing::debug!(generation, "dropping stale session assignment");
            return;
        }
        if self.session_adopted || self.deltas_seen {
            return;
        }
        self.session_id = session_id;
        self.session_adopted = true;
    }

    /// Append a delta to the in-progress assistant message. Returns whether
    /// the delta was applied (stale generations and empty deltas are no-ops).
    pub(crate) fn append_delta(&mut self, generation: u64, delta: &str) -> bool {
        if !self.is_live(generation) {
            tracing::debug!(generation, "dropping stale content delta");
            return false;
        }
        if delta.is_empty() {
            return false;
        }
        self.deltas_seen = true;
        if let Some(reply) = self.messages.last_mut() {
            reply.content.push_str(delta);
        }
        true
    }

    /// Finalize the turn normally (`Producing -> Idle`). Returns whether the
    /// transition happened.
    pub(crate) fn finish_turn(&mut self, generation: u64) -> bool {
        if !self.is_live(generation) {
            return false;
        }
        self.phase = TurnPhase::Idle;
        true
    }

    /// Finalize the turn as failed: replace the in-progress reply wholesale
    /// with a marker-prefixed reason. This replacement is the single
    /// exception to append-only content mutation.
    pub(crate) fn fail_turn(&mut self, generation: u64, reason: &str) -> bool {
        if !self.is_live(generation) {
            return false;
        }
        if let Some(reply) = self.messages.last_mut() {
            reply.content = format!("{ERROR_MARKER} {reason}");
        }
        self.phase = TurnPhase::Idle;
        true
    }

    /// Clear the transcript and mint a fresh session id. The generation bump
    /// makes any still-in-flight turn stale, so its late events are dropped
    /// rather than applied to the new state.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.session_id = Uuid::new_v4().to_string();
        self.generation += 1;
        self.phase = TurnPhase::Idle;
        self.session_adopted = false;
        self.deltas_seen = false;
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_turn_appends_pair_and_produces() {
        let mut conv = Conversation::new();
        let generation = conv.begin_turn("hello");

        assert!(conv.is_producing());
        assert_eq!(generation, 1);
        assert_eq!(conv.messages().len(), 2);
        assert_eq!(conv.messages()[0], ChatMessage::user("hello"));
        assert_eq!(conv.messages()[1], ChatMessage::assistant(""));
    }

    #[test]
    fn test_deltas_concatenate_in_order() {
        let mut conv = Conversation::new();
        let generation = conv.begin_turn("hi");
        assert!(conv.append_delta(generation, "A"));
        assert!(conv.append_delta(generation, "B"));
        assert!(conv.finish_turn(generation));

        assert_eq!(conv.messages()[1].content, "AB");
        assert!(!conv.is_producing());
    }

    #[test]
    fn test_empty_delta_is_a_noop() {
        let mut conv = Conversation::new();
        let generation = conv.begin_turn("hi");
        assert!(!conv.append_delta(generation, ""));
        assert_eq!(conv.messages()[1].content, "");
    }

    #[test]
    fn test_delta_after_finish_is_dropped() {
        let mut conv = Conversation::new();
        let generation = conv.begin_turn("hi");
        conv.append_delta(generation, "done");
        conv.finish_turn(generation);

        assert!(!conv.append_delta(generation, "late"));
        assert_eq!(conv.messages()[1].content, "done");
    }

    #[test]
    fn test_fail_replaces_content_wholesale() {
        let mut conv = Conversation::new();
        let generation = conv.begin_turn("hi");
        conv.append_delta(generation, "partial garbage");
        assert!(conv.fail_turn(generation, "connection reset"));

        let reply = &conv.messages()[1].content;
        assert!(reply.starts_with(ERROR_MARKER), "got: {}", reply);
        assert!(reply.contains("connection reset"));
        assert!(!reply.contains("partial garbage"));
        assert!(!conv.is_producing());
    }

    #[test]
    fn test_session_adopted_once_per_turn() {
        let mut conv = Conversation::new();
        let generation = conv.begin_turn("hi");

        conv.adopt_session(generation, "server-1".into());
        assert_eq!(conv.session_id(), "server-1");

        conv.adopt_session(generation, "server-2".into());
        assert_eq!(conv.session_id(), "server-1");
    }

    #[test]
    fn test_session_not_adopted_after_deltas() {
        let mut conv = Conversation::new();
        let before = conv.session_id().to_string();
        let generation = conv.begin_turn("hi");
        conv.append_delta(generation, "text");

        conv.adopt_session(generation, "too-late".into());
        assert_eq!(conv.session_id(), before);
    }

    #[test]
    fn test_reset_clears_and_mints_new_session() {
        let mut conv = Conversation::new();
        let before = conv.session_id().to_string();
        let generation = conv.begin_turn("hi");
        conv.append_delta(generation, "text");
        conv.finish_turn(generation);

        conv.reset();
        assert!(conv.messages().is_empty());
        assert_ne!(conv.session_id(), before);
        assert!(!conv.is_producing());
    }

    #[test]
    fn test_stale_generation_after_reset_is_dropped() {
        let mut conv = Conversation::new();
        let generation = conv.begin_turn("hi");
        conv.reset();

        assert!(!conv.append_delta(generation, "late"));
        assert!(!conv.finish_turn(generation));
        assert!(!conv.fail_turn(generation, "late failure"));
        assert!(conv.messages().is_empty());
        assert!(!conv.is_producing());
    }

    #[test]
    fn test_generations_increase_across_turns() {
        let mut conv = Conversation::new();
        let first = conv.begin_turn("one");
        conv.finish_turn(first);
        let second = conv.begin_turn("two");
        assert!(second > first);
    }
}
