//! worklog-api: wire layer for the work-log backend
//!
//! This crate covers the plain request/response endpoints (records, report
//! generation, health) and the streamed chat endpoint, including the frame
//! decoder that turns raw response bytes into typed chat events.

pub mod client;
pub mod error;
pub mod stream;
pub mod types;

pub use client::ApiClient;
pub use error::{Error, Result};
pub use stream::{ChatEvent, ChatEventStream, Decoded, FrameDecoder};
pub use types::*;
