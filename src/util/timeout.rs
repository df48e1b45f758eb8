//! Timeout and cancellation guard for conversation steps.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{GenbindError, Result};

/// Run `future`, failing with [`GenbindError::Timeout`] once `duration`
/// elapses.
pub async fn with_timeout<T>(duration: Duration, future: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(GenbindError::Timeout(duration.as_millis() as u64)),
    }
}

/// Run `future` under an optional timeout and an optional cancellation
/// token. Cancellation wins over completion when both are ready; the
/// future is dropped either way.
pub async fn guarded<T>(
    round: usize,
    timeout: Option<Duration>,
    cancel: Option<&CancellationToken>,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    let timed = async {
        match timeout {
            Some(duration) => with_timeout(duration, future).await,
            None => future.await,
        }
    };
    match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(GenbindError::Cancelled { round }),
                result = timed => result,
            }
        }
        None => timed.await,
    }
}
