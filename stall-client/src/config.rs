//! Client configuration

use std::time::Duration;

use crate::retry::RetryPolicy;

/// Client configuration for connecting to the stall server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:3000")
    pub base_url: String,

    /// Per-attempt timeout
    pub timeout: Duration,

    /// Extra attempts after the first one
    pub retries: u32,

    /// Delay before the first retry; doubled after each retry
    pub retry_delay: Duration,

    /// Upper bound for the retry delay
    pub max_retry_delay: Duration,

    /// Interval of [`crate::OrderPoller`]
    pub poll_interval: Duration,
}

impl ClientConfig {
    /// Create a new client configuration with default retry settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
            retries: 3,
            retry_delay: Duration::from_millis(1000),
            max_retry_delay: Duration::from_secs(10),
            poll_interval: Duration::from_secs(5),
        }
    }

    /// Set the per-attempt timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry count
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set the initial and maximum retry delay
    pub fn with_retry_delay(mut self, initial: Duration, max: Duration) -> Self {
        self.retry_delay = initial;
        self.max_retry_delay = max.max(initial);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: self.timeout,
            retries: self.retries,
            retry_delay: self.retry_delay,
            max_delay: self.max_retry_delay,
        }
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> crate::ClientResult<crate::HttpClient> {
        crate::HttpClient::new(self)
    }

    /// Create the typed API client from this configuration
    pub fn build_api(&self) -> crate::ClientResult<crate::StallApi> {
        Ok(crate::StallApi::new(self.build_http_client()?))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}
