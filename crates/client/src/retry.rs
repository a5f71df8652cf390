use std::future::Future;
use std::time::Duration;

use crate::ClientError;

/// Bounded, fixed-delay retry for transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }

    /// Runs `op` until it succeeds, fails with a non-transport error, or
    /// the retries are used up.
    ///
    /// `on_retry` is told the retry number (1-based) and the error that
    /// triggered it, before the delay.
    pub async fn run<T, F, Fut, R>(&self, mut op: F, mut on_retry: R) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
        R: FnMut(u32, &ClientError),
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transport() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "request failed, retrying"
                    );
                    on_retry(attempt, &e);
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn transport_error() -> ClientError {
        ClientError::Status {
            status: 503,
            message: "unavailable".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transport_errors_until_success() {
        let calls = Cell::new(0);
        let mut retries = Vec::new();

        let result = RetryPolicy::default()
            .run(
                || {
                    calls.set(calls.get() + 1);
                    let n = calls.get();
                    async move {
                        if n < 3 { Err(transport_error()) } else { Ok(n) }
                    }
                },
                |attempt, _| retries.push(attempt),
            )
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(retries, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let calls = Cell::new(0);
        let result: Result<(), _> = RetryPolicy::default()
            .run(
                || {
                    calls.set(calls.get() + 1);
                    async { Err(transport_error()) }
                },
                |_, _| {},
            )
            .await;

        assert!(matches!(result, Err(ClientError::Status { status: 503, .. })));
        assert_eq!(calls.get(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_between_attempts() {
        let start = tokio::time::Instant::now();
        let _: Result<(), _> = RetryPolicy::default()
            .run(|| async { Err(transport_error()) }, |_, _| {})
            .await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(3), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(4), "{elapsed:?}");
    }

    #[tokio::test]
    async fn rejection_is_not_retried() {
        let calls = Cell::new(0);
        let result: Result<(), _> = RetryPolicy::default()
            .run(
                || {
                    calls.set(calls.get() + 1);
                    async {
                        Err(ClientError::Rejected {
                            message: "invalid session".into(),
                        })
                    }
                },
                |_, _| panic!("must not retry"),
            )
            .await;

        assert_eq!(result.unwrap_err().rejection(), Some("invalid session"));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn none_policy_single_attempt() {
        let calls = Cell::new(0);
        let _: Result<(), _> = RetryPolicy::none()
            .run(
                || {
                    calls.set(calls.get() + 1);
                    async { Err(transport_error()) }
                },
                |_, _| {},
            )
            .await;
        assert_eq!(calls.get(), 1);
    }
}
