//! Retry with exponential back-off for ViewStats page fetches.

use std::future::Future;
use std::time::Duration;

use crate::error::ViewStatsError;

/// Retriable errors:
/// - [`ViewStatsError::RateLimited`]: HTTP 429.
/// - [`ViewStatsError::Http`]: timeouts and connection failures.
/// - [`ViewStatsError::UnexpectedStatus`] / [`ViewStatsError::Render`] with a 5xx status.
fn is_retriable(err: &ViewStatsError) -> bool {
    match err {
        ViewStatsError::RateLimited { .. } => true,
        ViewStatsError::Http(e) => e.is_timeout() || e.is_connect(),
        ViewStatsError::UnexpectedStatus { status, .. } | ViewStatsError::Render { status, .. } => {
            *status >= 500
        }
        ViewStatsError::InvalidUrl { .. } => false,
    }
}

/// Longest single wait, whatever the server asks for.
const MAX_DELAY_MS: u64 = 60_000;

/// Wait before retry number `attempt + 1`: `backoff_base_ms * 2^attempt`, or
/// the server's `Retry-After` when it asked for longer, capped at 60 s.
fn retry_delay_ms(err: &ViewStatsError, attempt: u32, backoff_base_ms: u64) -> u64 {
    let mut delay_ms = backoff_base_ms.saturating_mul(1u64 << attempt.min(20));
    if let ViewStatsError::RateLimited {
        retry_after_secs, ..
    } = err
    {
        delay_ms = delay_ms.max(retry_after_secs.saturating_mul(1_000));
    }
    delay_ms.min(MAX_DELAY_MS)
}

/// Executes `operation`, retrying transient errors up to `max_retries` times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ViewStatsError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ViewStatsError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        let delay_ms = retry_delay_ms(&err, attempt, backoff_base_ms);
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms,
            error = %err,
            "transient ViewStats error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        attempt += 1;
    }
}
