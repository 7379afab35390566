//! Bounded retries with start-to-start spacing.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::error::{FetchError, FetchResult};
use crate::transport::Transport;

/// How often and how far apart a URL is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Minimum time between the *starts* of two consecutive attempts.
    pub spacing: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            spacing: Duration::from_millis(3000),
        }
    }
}

/// GET requests against a [`Transport`] under a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct ResilientFetch {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl ResilientFetch {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetch `url` as text.
    ///
    /// Non-2xx statuses and transport errors are failed attempts. Before a
    /// retry the call waits until `spacing` has passed since the previous
    /// attempt *started*; no wait happens if that time is already over.
    pub async fn fetch_text(&self, url: &str) -> FetchResult<String> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_start: Option<Instant> = None;
        let mut reason = String::new();

        for attempt in 1..=max_attempts {
            if let Some(previous) = last_start {
                sleep_until(previous + self.policy.spacing).await;
            }
            last_start = Some(Instant::now());

            if attempt == 1 {
                info!(url, "fetching");
            } else {
                debug!(url, attempt, "retrying");
            }

            match self.transport.get(url).await {
                Ok(response) if response.is_success() => return Ok(response.body),
                Ok(response) => reason = format!("HTTP {}", response.status),
                Err(e) => reason = e.to_string(),
            }

            if attempt < max_attempts {
                warn!(url, attempt, max_attempts, %reason, "request failed, will retry");
            }
        }

        Err(FetchError::Network {
            url: url.to_string(),
            attempts: max_attempts,
            reason,
        })
    }

    /// Fetch `url` and parse it as JSON.
    ///
    /// A body that does not parse is reported as malformed metadata and is
    /// not retried.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        let body = self.fetch_text(url).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::MalformedMetadata {
            origin: url.to_string(),
            reason: e.to_string(),
        })
    }
}
