//! @ai:module:intent Paced, individually timed call attempts with exponential backoff
//! @ai:module:layer infrastructure
//! @ai:module:public_api RetryPolicy, Attempt, retry_paced
//! @ai:module:stateless true

use crate::client::rate_limiter::RateLimiter;
use crate::error::ClientError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// @ai:intent How often and how long a single operation may be attempted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Bound on one attempt; pacing and backoff are not counted.
    pub request_timeout: Duration,
    pub retry_base: Duration,
}

impl RetryPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_base * 2u32.saturating_pow(attempt)
    }
}

/// @ai:intent Successful value plus the cost of the attempt that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt<T> {
    pub value: T,
    pub latency: Duration,
    /// 1-based number of the attempt that succeeded.
    pub attempt: u32,
}

/// @ai:intent Run `call` until it succeeds, fails permanently or exhausts the retries
/// @ai:pre policy.request_timeout > 0
/// @ai:effects network, time
pub async fn retry_paced<T, F, Fut>(
    limiter: &RateLimiter,
    policy: &RetryPolicy,
    operation: &str,
    call: F,
) -> Result<Attempt<T>, ClientError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut attempt = 0u32;
    loop {
        limiter.acquire().await;

        let start = Instant::now();
        let outcome = tokio::time::timeout(policy.request_timeout, call())
            .await
            .unwrap_or(Err(ClientError::Timeout(policy.request_timeout)));
        let latency = start.elapsed();

        match outcome {
            Ok(value) => {
                return Ok(Attempt {
                    value,
                    latency,
                    attempt: attempt + 1,
                })
            }
            Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                let backoff = policy.backoff(attempt);
                tracing::debug!(
                    "{} failed (attempt {}): {}; retrying in {:?}",
                    operation,
                    attempt + 1,
                    err,
                    backoff
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            request_timeout: Duration::from_secs(2),
            retry_base: Duration::from_millis(250),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_attempt_is_retried() {
        let limiter = RateLimiter::new(600);
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let outcome = retry_paced(&limiter, &policy(2), "chat completion", move || async move {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                std::future::pending::<()>().await;
            }
            Ok::<_, ClientError>("pong")
        })
        .await
        .unwrap();

        assert_eq!(outcome.value, "pong");
        assert_eq!(outcome.attempt, 2);
        assert!(outcome.latency < Duration::from_secs(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_error_survives_exhausted_retries() {
        let limiter = RateLimiter::new(600);
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let err = retry_paced(&limiter, &policy(3), "list models", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(ClientError::Status {
                status: 503,
                body: "overloaded".to_string(),
            })
        })
        .await
        .unwrap_err();

        assert_eq!(
            err,
            ClientError::Status {
                status: 503,
                body: "overloaded".to_string()
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_wait_is_not_latency_or_timeout() {
        let limiter = RateLimiter::new(1);
        let policy = policy(0);

        let first = retry_paced(&limiter, &policy, "chat completion", || async {
            Ok::<_, ClientError>(1)
        })
        .await
        .unwrap();

        let waited_from = Instant::now();
        let second = retry_paced(&limiter, &policy, "chat completion", || async {
            Ok::<_, ClientError>(2)
        })
        .await
        .unwrap();

        assert_eq!(first.value, 1);
        assert_eq!(second.value, 2);
        assert!(waited_from.elapsed() >= Duration::from_secs(59));
        assert!(second.latency < Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_errors_are_not_retried() {
        let limiter = RateLimiter::new(600);
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let err = retry_paced(&limiter, &policy(3), "chat completion", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(ClientError::Status {
                status: 401,
                body: String::new(),
            })
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ClientError::Status { status: 401, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
