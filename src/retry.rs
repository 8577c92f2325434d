//! Retry policy for transient remote failures
//!
//! Both the reconciliation engine and the translation backend wrap their
//! network calls in a [`RetryPolicy`]: a fixed number of attempts with
//! exponential backoff, retrying only errors its predicate classifies as
//! transient.

use std::future::Future;
use std::time::Duration;

/// Exponential backoff schedule with a bounded number of attempts
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
    /// Multiplier applied per attempt
    pub multiplier: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            multiplier: 2.0,
        }
    }

    /// Schedule used around the destination existence-check + upsert unit
    pub fn for_reconciliation() -> Self {
        Self::new(4, Duration::from_secs(3), Duration::from_secs(30))
    }

    /// Schedule used around a single translation call
    pub fn for_translation() -> Self {
        Self::new(3, Duration::from_secs(2), Duration::from_secs(10))
    }

    /// Delay to sleep after a failed attempt (1-based), capped at `max_delay`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.as_millis() as f64
            * self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let capped = (exp as u64).min(self.max_delay.as_millis() as u64);
        Duration::from_millis(capped)
    }

    /// Runs `op` until it succeeds or the attempt budget is exhausted;
    /// non-retryable errors fail immediately. Returns the last error on
    /// failure.
    pub async fn run<T, E, F, Fut, P>(&self, mut op: F, is_retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.max_attempts || !is_retryable(&err) {
                        return Err(err);
                    }
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        "Attempt {}/{} failed: {} — retrying in {:?}",
                        attempt,
                        self.max_attempts,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
