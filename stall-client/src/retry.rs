//! Timeout + exponential backoff around a single request
//!
//! ```text
//! attempt 1 ──timeout/5xx──▶ sleep d ──▶ attempt 2 ──▶ sleep 2d ──▶ ... ──▶ attempt retries+1
//!     │                                                                          │
//!     └── success / 4xx / cancel: return immediately ◀───────────────────────────┘
//! ```

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, ClientResult};

/// Retry settings for one logical request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Per-attempt timeout; the in-flight future is dropped on expiry
    pub timeout: Duration,
    /// Extra attempts after the first
    pub retries: u32,
    /// Delay before the first retry
    pub retry_delay: Duration,
    /// Cap for the doubled delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retries: 3,
            retry_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.retry_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Which failures a request may be retried on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryMode {
    /// Any transient failure (timeout, connect, 5xx/408/429)
    Transient,
    /// Only failures where the request never reached the server.
    /// For writes without an idempotency key.
    Unsent,
}

impl RetryMode {
    pub fn allows(self, error: &ClientError) -> bool {
        match self {
            RetryMode::Transient => error.is_transient(),
            RetryMode::Unsent => error.is_unsent(),
        }
    }
}

/// Run `op` until it succeeds, fails permanently, or attempts run out
///
/// `op` receives the 1-based attempt number. Cancelling `cancel` aborts the
/// current attempt or backoff sleep and returns [`ClientError::Aborted`].
pub async fn fetch_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    op: F,
) -> ClientResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    fetch_with_retry_mode(policy, RetryMode::Transient, cancel, op).await
}

/// [`fetch_with_retry`] restricted to the failures `mode` allows
pub async fn fetch_with_retry_mode<T, F, Fut>(
    policy: &RetryPolicy,
    mode: RetryMode,
    cancel: &CancellationToken,
    mut op: F,
) -> ClientResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    let max_attempts = policy.retries.saturating_add(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ClientError::Aborted),
            result = tokio::time::timeout(policy.timeout, op(attempt)) => {
                result.unwrap_or(Err(ClientError::Timeout(policy.timeout)))
            }
        };

        let error = match outcome {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt, "Request succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if !mode.allows(&error) || attempt >= max_attempts {
            if mode.allows(&error) {
                tracing::error!(attempt, error = %error, "Request failed, retries exhausted");
            }
            return Err(error);
        }

        let delay = policy.delay_for(attempt);
        tracing::warn!(
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Request failed, retrying"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ClientError::Aborted),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
