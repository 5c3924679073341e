//! HTTP client for the work-log backend

use async_stream::stream;
use chrono::NaiveDate;
use futures::StreamExt;

use crate::{
    error::{Error, Result},
    stream::{ChatEventStream, Decoded, FrameDecoder},
    types::{ChatRequest, ErrorBody, WorkRecord, WorkRecordReceipt},
};

/// Client for the work-log backend API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client against the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Open a streamed chat exchange.
    ///
    /// Fails before yielding anything if the response status is not
    /// successful; afterwards, transport failures surface as `Err` items on
    /// the stream.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatEventStream> {
        let url = format!("{}/api/chat/", self.base_url);
        let response = self.http.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status.as_u16(), response).await);
        }

        let mut body = response.bytes_stream();

        let events: ChatEventStream = Box::pin(stream! {
            let mut decoder = FrameDecoder::new();

            while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(Error::Http(e));
                        return;
                    }
                };

                for decoded in decoder.feed(&chunk) {
                    match decoded {
                        Decoded::Event(event) => yield Ok(event),
                        Decoded::Warning { payload, reason } => {
                            tracing::warn!(%reason, payload, "dropping undecodable chat record");
                        }
                        Decoded::Skip => {}
                    }
                }
            }

            let dropped = decoder.finish();
            if dropped > 0 {
                tracing::debug!(bytes = dropped, "discarding unterminated trailing record");
            }
        });

        Ok(events)
    }

    /// Submit a work-log entry
    pub async fn create_record(&self, record: &WorkRecord) -> Result<WorkRecordReceipt> {
        let url = format!("{}/api/records/", self.base_url);
        let response = self.http.post(&url).json(record).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status.as_u16(), response).await);
        }
        Ok(response.json().await?)
    }

    /// Generate the daily report for `date` (server defaults to today)
    pub async fn generate_daily_report(&self, date: Option<NaiveDate>) -> Result<String> {
        let url = format!("{}/api/records/daily/generate", self.base_url);
        let mut request = self.http.post(&url);
        if let Some(date) = date {
            request = request.query(&[("record_date", date.to_string())]);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status.as_u16(), response).await);
        }
        // The endpoint returns a JSON-encoded Markdown string
        Ok(response.json().await?)
    }

    /// Generate the weekly report covering `start..=end`
    pub async fn generate_weekly_report(&self, start: NaiveDate, end: NaiveDate) -> Result<String> {
        let url = format!("{}/api/records/weekly/generate", self.base_url);
        let response = self
            .http
            .post(&url)
            .query(&[
                ("start_date", start.to_string()),
                ("end_date", end.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status.as_u16(), response).await);
        }
        Ok(response.json().await?)
    }

    /// Probe the backend health endpoint
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(api_error(status.as_u16(), response).await);
        }
        Ok(())
    }
}

/// Turn a non-success response into an [`Error::Api`], preferring the
/// backend's `{"detail": ...}` payload over the raw body.
async fn api_error(status: u16, response: reqwest::Response) -> Error {
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.detail)
        .unwrap_or(body);
    Error::api(status, detail)
}
