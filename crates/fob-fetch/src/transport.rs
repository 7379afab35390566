//! Outbound HTTP seam.
//!
//! Everything the fetcher sends to a remote backend goes through [`Transport`],
//! so tests can swap the network for an in-memory route table.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::FetchConfig;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors raised by a single request, before any retry.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// A fully read response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues idempotent GET requests.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn get(&self, url: &str) -> TransportResult<HttpResponse>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a client with the user agent and timeout from `config`.
    pub fn new(config: &FetchConfig) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.request_timeout_secs.min(10)))
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> TransportResult<HttpResponse> {
        let parsed = url::Url::parse(url).map_err(|e| TransportError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;
        let body = String::from_utf8(bytes.to_vec())
            .map_err(|e| TransportError::Body(format!("{url}: {e}")))?;

        Ok(HttpResponse { status, body })
    }
}
