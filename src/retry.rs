//! Retry an operation with linear or exponential backoff.
//!
//! This helper is independent of the FSM engine: it shares no code path
//! with it. An integrator may wrap a machine's side-effects with it at the
//! call site, but the engine itself never retries.
//!
//! Cancellation is cooperative: the provided token is checked before the
//! first attempt and raced against every backoff wait, so a long wait ends
//! as soon as the token fires.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Errors returned by the retry helpers.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed. Carries the total attempt count and the last
    /// underlying error.
    #[error("retry: max attempts exceeded (total {attempts} attempts)")]
    MaxAttemptsExceeded {
        attempts: usize,
        #[source]
        last: E,
    },

    /// The cancellation token fired before the first attempt or during a
    /// backoff wait.
    #[error("retry: canceled")]
    Canceled,
}

/// Attempt `op` up to `1 + retries` times with a constant wait between
/// attempts.
///
/// # Example
///
/// ```rust
/// use fsmkit::retry;
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// # #[derive(Debug, thiserror::Error)]
/// # #[error("boom")]
/// # struct Boom;
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let cancel = CancellationToken::new();
/// let result: Result<u32, _> = retry::linearly(
///     &cancel,
///     || async { Ok::<_, Boom>(42) },
///     3,
///     Duration::from_millis(10),
/// )
/// .await;
/// assert_eq!(result.unwrap(), 42);
/// # });
/// ```
pub async fn linearly<T, E, F, Fut>(
    cancel: &CancellationToken,
    op: F,
    retries: usize,
    backoff: Duration,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    run(cancel, op, retries, move || backoff).await
}

/// Attempt `op` up to `1 + retries` times, doubling the wait after each
/// failed attempt, starting from `initial_backoff`.
///
/// The delay saturates instead of overflowing for very large attempt
/// counts.
pub async fn exponentially<T, E, F, Fut>(
    cancel: &CancellationToken,
    op: F,
    retries: usize,
    initial_backoff: Duration,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut delay = initial_backoff;
    run(cancel, op, retries, move || {
        let current = delay;
        delay = delay.saturating_mul(2);
        current
    })
    .await
}

async fn run<T, E, F, Fut, B>(
    cancel: &CancellationToken,
    mut op: F,
    retries: usize,
    mut next_delay: B,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    B: FnMut() -> Duration,
{
    if cancel.is_cancelled() {
        return Err(RetryError::Canceled);
    }

    let mut last = match op().await {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    for attempt in 1..=retries {
        debug!(attempt, retries, "attempt failed, backing off");
        tokio::select! {
            _ = cancel.cancelled() => return Err(RetryError::Canceled),
            _ = tokio::time::sleep(next_delay()) => {}
        }

        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => last = err,
        }
    }

    Err(RetryError::MaxAttemptsExceeded {
        attempts: 1 + retries,
        last,
    })
}
