//! Exponential backoff around fallible async calls.

use std::future::Future;
use std::time::Duration;

use medi_config::LlmConfig;

use crate::error::LlmError;

/// Retry budget and backoff bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn from_config(config: &LlmConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }

    /// No retries and no waiting.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt + 1`: doubles each time, capped.
    /// A server-provided `Retry-After` wins when it is longer.
    #[must_use]
    pub fn backoff(&self, attempt: u32, err: &LlmError) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        let computed = self
            .initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff);
        match err {
            LlmError::RateLimited { retry_after_secs } => {
                computed.max(Duration::from_secs(*retry_after_secs).min(self.max_backoff))
            }
            _ => computed,
        }
    }
}

/// Run `operation` until it succeeds or the retry budget is spent.
///
/// Every error is retried. The error of the final attempt is returned.
///
/// # Errors
///
/// Returns the last [`LlmError`] once `policy.max_retries` retries have failed.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, mut operation: F) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(e) if attempt >= policy.max_retries => return Err(e),
            Err(e) => {
                let delay = policy.backoff(attempt, &e);
                tracing::warn!(
                    attempt = attempt + 1,
                    max = policy.max_retries,
                    backoff_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %e,
                    "retrying LLM call"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(4),
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = with_retry(&fast_policy(3), || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(LlmError::Api {
                    status: 503,
                    message: "busy".into(),
                })
            } else {
                Ok(n)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = with_retry(&fast_policy(2), || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(LlmError::Parse("bad body".into()))
        })
        .await;
        assert!(matches!(result, Err(LlmError::Parse(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_budget_calls_once() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = with_retry(&RetryPolicy::none(), || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(LlmError::NotConfigured("no key".into()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 5,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_millis(4_000),
        };
        let err = LlmError::Parse(String::new());
        assert_eq!(policy.backoff(0, &err), Duration::from_millis(500));
        assert_eq!(policy.backoff(1, &err), Duration::from_millis(1_000));
        assert_eq!(policy.backoff(3, &err), Duration::from_millis(4_000));
        assert_eq!(policy.backoff(10, &err), Duration::from_millis(4_000));
    }

    #[test]
    fn retry_after_is_respected_up_to_cap() {
        let policy = RetryPolicy {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
        };
        let err = LlmError::RateLimited {
            retry_after_secs: 2,
        };
        assert_eq!(policy.backoff(0, &err), Duration::from_secs(2));
        let long = LlmError::RateLimited {
            retry_after_secs: 60,
        };
        assert_eq!(policy.backoff(0, &long), Duration::from_secs(10));
    }

    #[test]
    fn policy_from_default_config() {
        let policy = RetryPolicy::from_config(&LlmConfig::default());
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.initial_backoff, Duration::from_millis(500));
    }
}
