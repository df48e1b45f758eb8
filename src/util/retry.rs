//! Retry with exponential backoff and jitter, for transports.

use std::future::Future;
use std::time::Duration;

use crate::error::{GenbindError, Result};

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Execute an async operation, retrying errors that
    /// [`GenbindError::is_retryable`] accepts.
    ///
    /// A rate-limit error carrying a retry delay waits at least that long.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut backoff = self.initial_backoff;
        let mut attempt = 1;

        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };
            if !err.is_retryable() || attempt >= self.max_attempts {
                return Err(err);
            }

            let jittered = backoff.mul_f64(0.75 + jitter() * 0.5);
            let delay = match &err {
                GenbindError::RateLimited {
                    retry_after_ms: Some(ms),
                } => jittered.max(Duration::from_millis(*ms)),
                _ => jittered,
            };
            tracing::warn!(
                attempt,
                max_attempts = self.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "retrying transport call"
            );
            tokio::time::sleep(delay).await;

            backoff = backoff.mul_f64(self.multiplier).min(self.max_backoff);
            attempt += 1;
        }
    }
}

/// Pseudo-random factor in [0, 1).
fn jitter() -> f64 {
    let bits = uuid::Uuid::new_v4().as_u128() as u64;
    (bits % 10_000) as f64 / 10_000.0
}
