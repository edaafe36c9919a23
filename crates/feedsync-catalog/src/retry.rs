//! Retry with exponential back-off for catalog calls.
//!
//! Throttled errors use a 4× base delay (the remote has explicitly asked us
//! to slow down); other transient errors use the plain base. Permanent
//! errors — validation, GraphQL, deserialization — are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::CatalogError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors worth retrying after a back-off delay.
///
/// **Retriable:** throttling, network-level failures (timeout, connection
/// reset), and 5xx statuses.
///
/// **Not retriable:** validation and GraphQL errors (the request itself is
/// wrong), deserialization failures, 4xx statuses, media poll timeouts.
fn is_retriable(err: &CatalogError) -> bool {
    match err {
        CatalogError::Throttled { .. } => true,
        CatalogError::Http(e) => e.is_timeout() || e.is_connect(),
        CatalogError::UnexpectedStatus { status } => *status >= 500,
        CatalogError::Validation { .. }
        | CatalogError::Graphql { .. }
        | CatalogError::Deserialize { .. }
        | CatalogError::MediaTimeout { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors.
///
/// The wait before the n-th retry is `base * 2^(n-1)` milliseconds with
/// ±25% jitter, capped at 60s, where `base` is `base_delay_ms` — or
/// `base_delay_ms * 4` when the previous failure was throttling. A
/// throttled error carrying a `Retry-After` hint sleeps at least that long.
///
/// # Errors
///
/// Returns the last error once retries are exhausted, or the first
/// non-retriable error immediately.
pub async fn with_retry<T, F, Fut>(
    max_retries: u32,
    base_delay_ms: u64,
    mut operation: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;

                let throttled = matches!(err, CatalogError::Throttled { .. });
                let base = if throttled {
                    base_delay_ms.saturating_mul(4)
                } else {
                    base_delay_ms
                };
                let mut computed = base.saturating_mul(1u64 << (attempt - 1).min(10));
                if let CatalogError::Throttled {
                    retry_after_secs: Some(secs),
                } = err
                {
                    computed = computed.max(secs.saturating_mul(1000));
                }
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;

                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    throttled,
                    error = %err,
                    "transient catalog error — retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
