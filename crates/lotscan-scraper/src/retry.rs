//! Retry policy for crawl requests.
//!
//! The crawl service is slow and occasionally flaky, so transient failures
//! are retried on a linear schedule: the wait before retry `n` is
//! `backoff_base_ms * n`. Rate-limit responses instead wait a fixed
//! `rate_limit_wait_ms`. Credential and content failures are terminal.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Linear backoff unit in milliseconds.
    pub backoff_base_ms: u64,
    /// Fixed wait after an HTTP 429.
    pub rate_limit_wait_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base_ms: 2_000,
            rate_limit_wait_ms: 5_000,
        }
    }
}

impl RetryPolicy {
    /// Returns how long to wait before retry number `retry` (1-based), or
    /// `None` if `err` must not be retried.
    ///
    /// | Error                                   | Wait                        |
    /// |-----------------------------------------|-----------------------------|
    /// | [`ScraperError::RateLimited`]           | `rate_limit_wait_ms`        |
    /// | [`ScraperError::UnexpectedStatus`]      | `backoff_base_ms × retry`   |
    /// | [`ScraperError::Http`]                  | `backoff_base_ms × retry`   |
    /// | [`ScraperError::Unauthorized`]          | terminal                    |
    /// | [`ScraperError::EmptyContent`]          | terminal                    |
    /// | [`ScraperError::InvalidUrl`]            | terminal                    |
    #[must_use]
    pub fn delay_for(&self, err: &ScraperError, retry: u32) -> Option<Duration> {
        match err {
            ScraperError::RateLimited => Some(Duration::from_millis(self.rate_limit_wait_ms)),
            ScraperError::UnexpectedStatus { .. } | ScraperError::Http(_) => Some(
                Duration::from_millis(self.backoff_base_ms.saturating_mul(u64::from(retry))),
            ),
            ScraperError::Unauthorized
            | ScraperError::EmptyContent { .. }
            | ScraperError::InvalidUrl { .. } => None,
        }
    }
}

/// Runs `operation` until it succeeds, fails terminally, or the retry budget
/// is spent. The closure receives the 1-based attempt number.
///
/// With the default policy and three consecutive 5xx responses, the
/// operation runs three times with waits of 2 s and 4 s in between, and the
/// third error is returned.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 1u32;

    loop {
        let err = match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let Some(delay) = policy.delay_for(&err, attempt) else {
            return Err(err);
        };

        if attempt > policy.max_retries {
            tracing::warn!(
                attempt,
                max_retries = policy.max_retries,
                error = %err,
                "crawl retries exhausted"
            );
            return Err(err);
        }

        #[allow(clippy::cast_possible_truncation)]
        let delay_ms = delay.as_millis() as u64;
        tracing::warn!(
            attempt,
            max_retries = policy.max_retries,
            delay_ms,
            error = %err,
            "transient crawl error, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
