//! Transport abstraction for opening a streamed chat exchange

use async_trait::async_trait;
use worklog_api::{ApiClient, ChatEventStream, ChatRequest};

/// Opens the event stream for one turn.
///
/// The seam exists so the reconciler can be driven by scripted streams in
/// tests; production code goes through [`HttpTransport`].
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Issue the request and return the reply's event stream.
    ///
    /// A non-success response fails here, before any event is yielded.
    async fn open(&self, request: ChatRequest) -> worklog_api::Result<ChatEventStream>;
}

/// Transport backed by the real backend
pub struct HttpTransport {
    client: ApiClient,
}

impl HttpTransport {
    /// Create a transport over an API client
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn open(&self, request: ChatRequest) -> worklog_api::Result<ChatEventStream> {
        self.client.chat(&request).await
    }
}
