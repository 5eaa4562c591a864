//! Retry with exponential back-off and jitter for page fetches.
//!
//! [`retry_with_backoff`] wraps a fallible async fetch and retries on
//! transient errors (timeouts, connection failures, 429, 5xx). Everything
//! else is returned immediately; a 404 will not turn into a 200 by asking
//! again.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - [`FetchError::Http`] timeouts and connection failures.
/// - [`FetchError::RateLimited`] (HTTP 429).
/// - [`FetchError::UnexpectedStatus`] with a 5xx status.
///
/// **Not retriable:**
/// - [`FetchError::NotFound`], 4xx statuses, invalid URLs or headers.
pub(crate) fn is_retriable(err: &FetchError) -> bool {
    match err {
        FetchError::Http(e) => e.is_timeout() || e.is_connect(),
        FetchError::RateLimited { .. } => true,
        FetchError::UnexpectedStatus { status, .. } => *status >= 500,
        FetchError::NotFound { .. } | FetchError::InvalidUrl { .. } | FetchError::InvalidHeader(_) => {
            false
        }
    }
}

/// Calls `operation` once, then again up to `max_retries` times while the
/// error is retriable.
///
/// The n-th retry waits `backoff_base_ms * 2^(n-1)`, scaled by a random
/// factor in 0.75..1.25. A 429 never waits less than its `Retry-After`.
/// No wait exceeds 60 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut retries = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if retries >= max_retries || !is_retriable(&err) {
            return Err(err);
        }
        retries += 1;
        let delay_ms = retry_delay_ms(retries, backoff_base_ms, &err);
        tracing::warn!(
            retry = retries,
            max_retries,
            delay_ms,
            error = %err,
            "page fetch failed, will retry"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

fn retry_delay_ms(retry: u32, backoff_base_ms: u64, err: &FetchError) -> u64 {
    let exponential = backoff_base_ms
        .saturating_mul(1u64 << (retry - 1).min(10))
        .min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (exponential as f64 * (0.75 + rand::random::<f64>() * 0.5)) as u64;
    let floor = match err {
        FetchError::RateLimited { retry_after_secs, .. } => retry_after_secs.saturating_mul(1_000),
        _ => 0,
    };
    jittered.max(floor).min(MAX_DELAY_MS)
}
