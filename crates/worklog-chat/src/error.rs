//! Error types for worklog-chat

use thiserror::Error;

/// Result type alias using worklog-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors rejected synchronously, before any network activity
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The question was empty or whitespace-only
    #[error("question must not be empty")]
    EmptyQuestion,

    /// A reply is already being produced for this conversation
    #[error("a reply is already being produced")]
    TurnInProgress,
}
