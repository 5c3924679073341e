//! Error types for worklog-api

use thiserror::Error;

/// Result type alias using worklog-api Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the work-log backend
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed (connect, mid-stream read, decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server answered with a non-success status
    #[error("server returned status {status}: {detail}")]
    Api { status: u16, detail: String },
}

impl Error {
    /// Create an API error from a status code and detail text
    pub fn api(status: u16, detail: impl Into<String>) -> Self {
        Self::Api {
            status,
            detail: detail.into(),
        }
    }

    /// The HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            Error::Json(_) => None,
        }
    }
}
