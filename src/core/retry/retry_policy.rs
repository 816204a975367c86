// Bounded retry around operations that can fail for network reasons.
//
// Only transient failures are retried. Anything else stops the loop on the
// first attempt so the caller can report it and exit.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Errors that can tell whether trying again might help.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Message-based classification: connection failures and timeouts.
pub fn looks_transient(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("failed to connect") || lower.contains("timeout")
}

#[derive(Debug, Error)]
pub enum RetryError<E: std::error::Error> {
    #[error("giving up after {attempts} attempt(s): {last}")]
    Exhausted { attempts: u32, last: E },
    #[error("{0}")]
    Fatal(E),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, interval: Duration) -> Self {
        Self { retries, interval }
    }

    /// Runs `op` until it succeeds, fails fatally, or `retries + 1` attempts are spent.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        E: std::error::Error + Transient,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut remaining = self.retries;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_transient() => return Err(RetryError::Fatal(err)),
                Err(err) if remaining == 0 => {
                    tracing::warn!("Retries exhausted. The network problem may be persistent.");
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: err,
                    });
                }
                Err(err) => {
                    remaining -= 1;
                    tracing::warn!(
                        "Connection failed ({}). Retrying in {} seconds. Retries left: {}",
                        err,
                        self.interval.as_secs(),
                        remaining
                    );
                    tokio::time::sleep(self.interval).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, Error)]
    #[error("{0}")]
    struct TestError(String);

    impl Transient for TestError {
        fn is_transient(&self) -> bool {
            looks_transient(&self.0)
        }
    }

    fn no_wait(retries: u32) -> RetryPolicy {
        RetryPolicy::new(retries, Duration::ZERO)
    }

    #[test]
    fn test_looks_transient() {
        assert!(looks_transient("failed to connect to all addresses"));
        assert!(looks_transient("Deadline exceeded: TIMEOUT"));
        assert!(looks_transient("Failed To Connect"));
        assert!(!looks_transient("PERMISSION_DENIED"));
    }

    #[tokio::test]
    async fn test_succeeds_first_try() {
        let calls = AtomicU32::new(0);
        let result = no_wait(3)
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, TestError>(7) }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_errors_stop_after_retries_plus_one() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = no_wait(3)
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError("failed to connect".into())) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match result {
            Err(RetryError::Exhausted { attempts, .. }) => assert_eq!(attempts, 4),
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_retries_means_one_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = no_wait(0)
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError("timeout".into())) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(RetryError::Exhausted { attempts: 1, .. })));
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = no_wait(5)
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError("INVALID_ARGUMENT".into())) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(RetryError::Fatal(_))));
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let result = no_wait(2)
            .run(|attempt| async move {
                if attempt < 3 {
                    Err(TestError("timeout".into()))
                } else {
                    Ok(attempt)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
    }
}
