//! Retry with exponential backoff
//!
//! [`with_retry`] runs an operation up to `max_attempts` times through
//! `tokio_retry2`. After each failure the policy's classifier decides whether
//! the error is transient; transient errors wait `2^i` seconds before attempt
//! `i + 1`, anything else ends the call. There is never a wait after the
//! final attempt.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio_retry2::strategy::ExponentialBackoff;
use tokio_retry2::Retry;

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    Fail,
}

/// How many times to try and which errors are worth another try
pub struct RetryPolicy<E> {
    pub max_attempts: u32,
    pub classify: fn(&E) -> RetryDecision,
}

impl<E> RetryPolicy<E> {
    /// Zero attempts is treated as one
    pub fn new(max_attempts: u32, classify: fn(&E) -> RetryDecision) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            classify,
        }
    }

    /// Delays between attempts: 1s, 2s, 4s, ... one fewer than the attempts
    pub fn strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(2)
            .factor(500)
            .take(self.max_attempts.saturating_sub(1) as usize)
    }
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for RetryPolicy<E> {}

impl<E> fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

/// Why [`with_retry`] gave up
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// The classifier refused to retry this error
    #[error("{0}")]
    Fatal(E),
    /// Every attempt failed with a retryable error
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },
}

/// Run `operation` under `policy`, passing it the 0-based attempt index
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy<E>,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let policy = *policy;
    let attempts = AtomicU32::new(0);

    let result = Retry::spawn(policy.strategy(), || {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst);
        let call = operation(attempt);
        async move {
            call.await.map_err(|err| match (policy.classify)(&err) {
                RetryDecision::Retry => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_attempts = policy.max_attempts,
                        error = %err,
                        "Attempt failed with a transient error"
                    );
                    tokio_retry2::RetryError::Transient {
                        err,
                        retry_after: None,
                    }
                }
                RetryDecision::Fail => {
                    tracing::error!(
                        attempt = attempt + 1,
                        error = %err,
                        "Attempt failed with a non-retryable error"
                    );
                    tokio_retry2::RetryError::Permanent(err)
                }
            })
        }
    })
    .await;

    result.map_err(|error| match (policy.classify)(&error) {
        RetryDecision::Fail => RetryError::Fatal(error),
        RetryDecision::Retry => {
            let attempts = attempts.load(Ordering::SeqCst);
            tracing::error!(attempts, error = %error, "No retries left");
            RetryError::Exhausted {
                attempts,
                last: error,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient,
        Permanent,
    }

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    fn classify(error: &TestError) -> RetryDecision {
        match error {
            TestError::Transient => RetryDecision::Retry,
            TestError::Permanent => RetryDecision::Fail,
        }
    }

    #[test]
    fn test_backoff_schedule() {
        let delays: Vec<Duration> = RetryPolicy::new(4, classify).strategy().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
            ]
        );
        assert_eq!(RetryPolicy::new(1, classify).strategy().count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, classify);
        let started = Instant::now();

        let result = with_retry(&policy, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(TestError::Transient)
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed().as_secs(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_reports_attempts_without_trailing_wait() {
        let policy = RetryPolicy::new(3, classify);
        let started = Instant::now();

        let result: Result<(), _> = with_retry(&policy, |_| async { Err(TestError::Transient) }).await;

        match result {
            Err(RetryError::Exhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last, TestError::Transient);
            }
            other => panic!("Expected exhaustion, got {:?}", other),
        }
        assert_eq!(started.elapsed().as_secs(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_stops_immediately() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(5, classify);
        let started = Instant::now();

        let result: Result<(), _> = with_retry(&policy, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError::Permanent) }
        })
        .await;

        assert!(matches!(result, Err(RetryError::Fatal(TestError::Permanent))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(0, classify);

        let result: Result<(), _> = with_retry(&policy, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError::Transient) }
        })
        .await;

        assert!(matches!(result, Err(RetryError::Exhausted { attempts: 1, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_error_messages() {
        let fatal: RetryError<TestError> = RetryError::Fatal(TestError::Permanent);
        assert_eq!(fatal.to_string(), "Permanent");

        let exhausted = RetryError::Exhausted {
            attempts: 3,
            last: TestError::Transient,
        };
        assert_eq!(exhausted.to_string(), "gave up after 3 attempts: Transient");
    }
}
