//! Chat orchestration: starting turns and reconciling streamed events
//!
//! One task per turn consumes the transport's event stream and applies each
//! event to the shared [`Conversation`] in arrival order. Every mutation is
//! tagged with the turn's generation, so a reset that races an in-flight
//! stream simply makes the rest of that stream a no-op.

use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use worklog_api::{ChatEvent, ChatRequest};

use crate::{
    conversation::{ChatMessage, Conversation},
    error::{Error, Result},
    events::ChatUpdate,
    transport::ChatTransport,
};

/// Reason used for an `error` event that carries no message
const GENERIC_ERROR_REASON: &str = "the server reported an error";

/// A single conversation and the machinery to advance it
pub struct Chat {
    transport: Arc<dyn ChatTransport>,
    conversation: Arc<Mutex<Conversation>>,
    update_tx: broadcast::Sender<ChatUpdate>,
}

/// Handle to a started turn
#[derive(Debug)]
pub struct TurnHandle {
    generation: u64,
    task: tokio::task::JoinHandle<()>,
}

impl TurnHandle {
    /// The generation tag of this turn's events
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait until the turn's consuming task has finished
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

impl Chat {
    /// Create a chat over the given transport
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        let (update_tx, _) = broadcast::channel(256);
        Self {
            transport,
            conversation: Arc::new(Mutex::new(Conversation::new())),
            update_tx,
        }
    }

    /// Subscribe to conversation updates
    pub fn subscribe(&self) -> broadcast::Receiver<ChatUpdate> {
        self.update_tx.subscribe()
    }

    /// Snapshot of the transcript
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.conversation.lock().messages().to_vec()
    }

    /// The current session id
    pub fn session_id(&self) -> String {
        self.conversation.lock().session_id().to_string()
    }

    /// Whether a reply is currently being produced
    pub fn is_producing(&self) -> bool {
        self.conversation.lock().is_producing()
    }

    /// Start a turn for `question`.
    ///
    /// Rejects empty/whitespace input and concurrent turns synchronously,
    /// before any network activity and without touching the transcript. On
    /// success the transport pipeline is consumed on a spawned task; observe
    /// progress via [`subscribe`](Self::subscribe) or the returned handle.
    pub fn start_turn(&self, question: &str) -> Result<TurnHandle> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::EmptyQuestion);
        }

        let (generation, request) = {
            let mut conversation = self.conversation.lock();
            if conversation.is_producing() {
                return Err(Error::TurnInProgress);
            }
            let generation = conversation.begin_turn(question);
            let request = ChatRequest {
                question: question.to_string(),
                session_id: conversation.session_id().to_string(),
            };
            (generation, request)
        };

        let _ = self.update_tx.send(ChatUpdate::TurnStart { generation });

        let transport = Arc::clone(&self.transport);
        let conversation = Arc::clone(&self.conversation);
        let update_tx = self.update_tx.clone();
        let task = tokio::spawn(async move {
            run_turn(transport, conversation, update_tx, generation, request).await;
        });

        Ok(TurnHandle { generation, task })
    }

    /// Clear the transcript and mint a fresh session id.
    ///
    /// An in-flight turn's request is not cancelled; its remaining events
    /// carry a stale generation and are dropped. Returns the new session id.
    pub fn reset_conversation(&self) -> String {
        let session_id = {
            let mut conversation = self.conversation.lock();
            conversation.reset();
            conversation.session_id().to_string()
        };
        let _ = self.update_tx.send(ChatUpdate::Reset {
            session_id: session_id.clone(),
        });
        session_id
    }
}

/// Consume one turn's event stream and apply it to the conversation.
async fn run_turn(
    transport: Arc<dyn ChatTransport>,
    conversation: Arc<Mutex<Conversation>>,
    update_tx: broadcast::Sender<ChatUpdate>,
    generation: u64,
    request: ChatRequest,
) {
    let mut events = match transport.open(request).await {
        Ok(events) => events,
        Err(e) => {
            fail_turn(&conversation, &update_tx, generation, &e.to_string());
            return;
        }
    };

    while let Some(item) = events.next().await {
        let event = match item {
            Ok(event) => event,
            Err(e) => {
                fail_turn(&conversation, &update_tx, generation, &e.to_string());
                return;
            }
        };

        match event {
            ChatEvent::Start { session_id } => {
                if let Some(session_id) = session_id {
                    conversation.lock().adopt_session(generation, session_id);
                }
            }
            ChatEvent::Content { content } => {
                let applied = conversation.lock().append_delta(generation, &content);
                if applied {
                    let _ = update_tx.send(ChatUpdate::Delta {
                        generation,
                        content,
                    });
                }
            }
            ChatEvent::End => {
                finish_turn(&conversation, &update_tx, generation);
                return;
            }
            ChatEvent::Error { message } => {
                let reason = message.unwrap_or_else(|| GENERIC_ERROR_REASON.to_string());
                fail_turn(&conversation, &update_tx, generation, &reason);
                return;
            }
            ChatEvent::Unknown => {
                tracing::debug!(generation, "ignoring unrecognized chat event kind");
            }
        }
    }

    // Transport completed without a terminal event: the turn still ends.
    finish_turn(&conversation, &update_tx, generation);
}

fn finish_turn(
    conversation: &Mutex<Conversation>,
    update_tx: &broadcast::Sender<ChatUpdate>,
    generation: u64,
) {
    if conversation.lock().finish_turn(generation) {
        let _ = update_tx.send(ChatUpdate::TurnEnd { generation });
    }
}

fn fail_turn(
    conversation: &Mutex<Conversation>,
    update_tx: &broadcast::Sender<ChatUpdate>,
    generation: u64,
    reason: &str,
) {
    if conversation.lock().fail_turn(generation, reason) {
        let _ = update_tx.send(ChatUpdate::TurnFailed {
            generation,
            message: reason.to_string(),
        });
    }
}
