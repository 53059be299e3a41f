use connectors::error::FetchError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Indicates whether an error should be retried or treated as fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDisposition {
    Retry,
    Stop,
}

/// Result of running an operation under the retry policy.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The error was considered fatal and should bubble up immediately.
    Fatal(E),
    /// The error was retryable, but the configured attempts were exhausted.
    AttemptsExceeded(E),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: if max_delay.is_zero() {
                base_delay
            } else {
                max_delay
            },
        }
    }

    /// Default backoff with a caller-chosen attempt budget.
    pub fn with_attempts(max_attempts: usize) -> Self {
        let default = Self::default();
        Self::new(max_attempts, default.base_delay, default.max_delay)
    }

    /// Single attempt, no waiting.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Executes the operation with the configured retry policy.
    pub async fn run<F, Fut, T, E, Classifier>(
        &self,
        mut op: F,
        classify: Classifier,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
        Classifier: Fn(&E) -> RetryDisposition,
    {
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(result) => return Ok(result),
                Err(err) => match classify(&err) {
                    RetryDisposition::Stop => return Err(RetryError::Fatal(err)),
                    RetryDisposition::Retry => {
                        if attempt + 1 >= self.max_attempts {
                            return Err(RetryError::AttemptsExceeded(err));
                        }

                        let delay = self.backoff_delay(attempt);
                        warn!(
                            attempt = attempt + 1,
                            max_attempts = self.max_attempts,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "Transient failure, retrying"
                        );
                        sleep(delay).await;
                        attempt += 1;
                    }
                },
            }
        }
    }

    fn backoff_delay(&self, attempt: usize) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }

        let factor = 1u32 << attempt.min(6);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Transport failures and server-side statuses are worth another attempt;
/// client errors and undecodable bodies are not.
pub fn classify_fetch_error(err: &FetchError) -> RetryDisposition {
    match err {
        FetchError::Transport { .. } => RetryDisposition::Retry,
        FetchError::Status { status, .. } if *status >= 500 || matches!(*status, 408 | 429) => {
            RetryDisposition::Retry
        }
        FetchError::Status { .. } | FetchError::Malformed { .. } | FetchError::Client(_) => {
            RetryDisposition::Stop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors::error::Service;
    use std::cell::Cell;

    fn status(code: u16) -> FetchError {
        FetchError::Status {
            service: Service::Catalog,
            status: code,
        }
    }

    #[test]
    fn classifies_statuses() {
        assert_eq!(classify_fetch_error(&status(503)), RetryDisposition::Retry);
        assert_eq!(classify_fetch_error(&status(429)), RetryDisposition::Retry);
        assert_eq!(classify_fetch_error(&status(404)), RetryDisposition::Stop);
        assert_eq!(classify_fetch_error(&status(401)), RetryDisposition::Stop);
        assert_eq!(
            classify_fetch_error(&FetchError::malformed(Service::SearchIndex, "x")),
            RetryDisposition::Stop
        );
    }

    #[test]
    fn backoff_is_capped() {
        let policy = RetryPolicy::new(10, Duration::from_millis(100), Duration::from_millis(350));
        assert_eq!(policy.backoff_delay(0), Duration::from_millis(100));
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(200));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(350));
        assert_eq!(policy.backoff_delay(9), Duration::from_millis(350));
        assert_eq!(RetryPolicy::none().backoff_delay(3), Duration::ZERO);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let policy = RetryPolicy::new(3, Duration::ZERO, Duration::ZERO);
        let calls = Cell::new(0);

        let result = policy
            .run(
                || {
                    calls.set(calls.get() + 1);
                    let n = calls.get();
                    async move { if n < 3 { Err(status(502)) } else { Ok(n) } }
                },
                classify_fetch_error,
            )
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn stops_on_fatal_and_on_exhaustion() {
        let policy = RetryPolicy::new(2, Duration::ZERO, Duration::ZERO);

        let calls = Cell::new(0);
        let fatal = policy
            .run(
                || {
                    calls.set(calls.get() + 1);
                    async { Err::<(), _>(status(400)) }
                },
                classify_fetch_error,
            )
            .await;
        assert!(matches!(fatal, Err(RetryError::Fatal(_))));
        assert_eq!(calls.get(), 1);

        let calls = Cell::new(0);
        let exhausted = policy
            .run(
                || {
                    calls.set(calls.get() + 1);
                    async { Err::<(), _>(status(500)) }
                },
                classify_fetch_error,
            )
            .await;
        assert!(matches!(exhausted, Err(RetryError::AttemptsExceeded(_))));
        assert_eq!(calls.get(), 2);
    }
}
