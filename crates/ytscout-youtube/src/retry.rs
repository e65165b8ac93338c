//! Retry with exponential back-off and jitter for the YouTube client.
//!
//! Only transient failures are retried. Quota and budget errors stop the
//! run immediately, since every retry would be charged against the quota.

use std::future::Future;
use std::time::Duration;

use crate::error::YoutubeError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 5xx, and HTTP 429.
///
/// **Not retriable:** [`YoutubeError::QuotaExceeded`],
/// [`YoutubeError::BudgetExceeded`], other 4xx API errors, and malformed
/// responses.
pub(crate) fn is_retriable(err: &YoutubeError) -> bool {
    match err {
        YoutubeError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        YoutubeError::Api { status, .. } => *status == 429 || *status >= 500,
        YoutubeError::QuotaExceeded(_)
        | YoutubeError::BudgetExceeded { .. }
        | YoutubeError::Deserialize { .. }
        | YoutubeError::Normalization { .. }
        | YoutubeError::InvalidBaseUrl { .. } => false,
    }
}

/// Longest single back-off wait.
const MAX_DELAY_MS: u64 = 60_000;

/// Wait before retry `retry` (1-based): `backoff_base_ms * 2^(retry-1)`,
/// capped at 60 s, then scaled by a jitter factor in `[0.75, 1.25)`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn jittered_delay_ms(retry: u32, backoff_base_ms: u64, jitter: f64) -> u64 {
    let exponent = retry.saturating_sub(1).min(10);
    let capped = backoff_base_ms
        .saturating_mul(1u64 << exponent)
        .min(MAX_DELAY_MS);
    (capped as f64 * (0.75 + 0.5 * jitter.clamp(0.0, 1.0))) as u64
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Waits follow [`jittered_delay_ms`]. HTTP 429 (`rateLimitExceeded`,
/// `userRateLimitExceeded`) is a short-window limit and is retried on that
/// schedule; a 403 `quotaExceeded` is the daily cap and comes back at once as
/// [`YoutubeError::QuotaExceeded`]. `operation` reserves quota on every
/// attempt, so a retry can itself fail with [`YoutubeError::BudgetExceeded`],
/// which ends the loop.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, YoutubeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, YoutubeError>>,
{
    let mut retries = 0u32;
    let err = loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if retries >= max_retries || !is_retriable(&err) {
            break err;
        }
        retries += 1;

        let delay_ms = jittered_delay_ms(retries, backoff_base_ms, rand::random::<f64>());
        tracing::warn!(
            retry = retries,
            max_retries,
            delay_ms,
            error = %err,
            "YouTube API call failed, backing off before retry"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    };

    if retries > 0 {
        tracing::error!(retries, error = %err, "YouTube API call failed after retries");
    }
    Err(err)
}
