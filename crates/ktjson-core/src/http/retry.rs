//! Retry logic for provider requests
//!
//! Transient failures are retried a bounded number of times after a fixed
//! delay. The delay schedule comes from `backoff` with a multiplier of one
//! and no randomization, so every retry waits the same short interval.

use crate::http::error::HttpError;
use backoff::{backoff::Backoff, ExponentialBackoff};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Delay before each retry (in milliseconds)
    pub delay_ms: u64,
    /// Growth factor between retries; `1.0` keeps the delay fixed
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            delay_ms: 1000,
            multiplier: 1.0,
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy with custom settings
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// No retries at all
    pub fn none() -> Self {
        Self::new(0)
    }

    /// Set the delay before each retry
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Create the backoff schedule
    pub fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.delay(),
            initial_interval: self.delay(),
            max_interval: self
                .delay()
                .mul_f64(self.multiplier.max(1.0).powi(self.max_retries as i32)),
            multiplier: self.multiplier,
            randomization_factor: 0.0,
            max_elapsed_time: None, // We handle max attempts separately
            ..Default::default()
        }
    }
}

/// Decision on whether to retry a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the request after the specified delay
    Retry { delay: Duration },
    /// Do not retry the request
    NoRetry,
}

/// Retry state for one logical request
#[derive(Debug)]
pub struct RetryHandler {
    policy: RetryPolicy,
    retries: u32,
    backoff: ExponentialBackoff,
}

impl RetryHandler {
    /// Create a new retry handler with the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        let backoff = policy.create_backoff();
        Self {
            policy,
            retries: 0,
            backoff,
        }
    }

    /// Determine if a request should be retried based on the error
    pub fn should_retry(&mut self, error: &HttpError) -> RetryDecision {
        if self.retries >= self.policy.max_retries {
            return RetryDecision::NoRetry;
        }

        if !error.should_retry() {
            return RetryDecision::NoRetry;
        }

        self.retries += 1;
        let delay = self.backoff.next_backoff().unwrap_or_else(|| self.policy.delay());

        RetryDecision::Retry { delay }
    }

    /// Reset the retry handler for a new request
    pub fn reset(&mut self) {
        self.retries = 0;
        self.backoff.reset();
    }

    /// Get the number of retries made so far
    pub fn retries(&self) -> u32 {
        self.retries
    }
}

/// Execute a request with retry logic
pub async fn execute_with_retry<F, Fut, T>(
    mut request_fn: F,
    policy: RetryPolicy,
) -> Result<T, HttpError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, HttpError>>,
{
    let mut handler = RetryHandler::new(policy);

    loop {
        match request_fn().await {
            Ok(response) => return Ok(response),
            Err(error) => match handler.should_retry(&error) {
                RetryDecision::Retry { delay } => {
                    log::warn!(
                        "Request failed (retry {}), retrying after {:?}: {}",
                        handler.retries(),
                        delay,
                        error
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::NoRetry => {
                    log::error!(
                        "Request failed after {} retries, not retrying: {}",
                        handler.retries(),
                        error
                    );
                    return Err(error);
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::error::ErrorClassification;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn error(classification: ErrorClassification) -> HttpError {
        HttpError {
            status_code: Some(500),
            classification,
            message: "boom".to_string(),
            details: None,
            retry_after: None,
        }
    }

    #[test]
    fn test_default_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 1);
        assert_eq!(policy.delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_retries_once_with_fixed_delay() {
        let policy = RetryPolicy::default().with_delay(Duration::from_millis(250));
        let mut handler = RetryHandler::new(policy);
        let err = error(ErrorClassification::ServerError);

        assert_eq!(
            handler.should_retry(&err),
            RetryDecision::Retry {
                delay: Duration::from_millis(250)
            }
        );
        assert_eq!(handler.retries(), 1);
        assert_eq!(handler.should_retry(&err), RetryDecision::NoRetry);
    }

    #[test]
    fn test_delay_stays_fixed_across_retries() {
        let policy = RetryPolicy::new(3).with_delay(Duration::from_millis(100));
        let mut handler = RetryHandler::new(policy);
        let err = error(ErrorClassification::NetworkError);
        for _ in 0..3 {
            assert_eq!(
                handler.should_retry(&err),
                RetryDecision::Retry {
                    delay: Duration::from_millis(100)
                }
            );
        }
        assert_eq!(handler.should_retry(&err), RetryDecision::NoRetry);
    }

    #[test]
    fn test_non_retryable_errors() {
        let mut handler = RetryHandler::new(RetryPolicy::default());
        assert_eq!(
            handler.should_retry(&error(ErrorClassification::AuthenticationError)),
            RetryDecision::NoRetry
        );
        assert_eq!(handler.retries(), 0);
    }

    #[tokio::test]
    async fn test_execute_with_retry_recovers_on_second_attempt() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default().with_delay(Duration::from_millis(1));

        let result = execute_with_retry(
            || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 0 {
                        Err(error(ErrorClassification::MalformedPayload))
                    } else {
                        Ok("done")
                    }
                }
            },
            policy,
        )
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_execute_with_retry_gives_up() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default().with_delay(Duration::from_millis(1));

        let result: Result<(), HttpError> = execute_with_retry(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(error(ErrorClassification::ServerError)) }
            },
            policy,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
