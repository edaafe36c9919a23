//! Bounded polling for media visibility.
//!
//! The catalog processes uploaded images asynchronously: media created a
//! moment ago may not yet be readable, and assigning an unprocessed media
//! id to a variant fails. This models the consistency lag explicitly as a
//! poll-with-timeout instead of assuming immediate visibility.

use std::time::Duration;

use feedsync_catalog::{CatalogApi, CatalogError, MediaRef};

/// Polls `get_media` until at least `min_count` media entries are visible,
/// sleeping `delay_ms` between attempts.
///
/// # Errors
///
/// - [`CatalogError::MediaTimeout`] once `attempts` polls have passed
///   without reaching `min_count`.
/// - Any error from the underlying `get_media` call.
pub async fn poll_media<C: CatalogApi>(
    client: &C,
    product_id: &str,
    min_count: usize,
    attempts: u32,
    delay_ms: u64,
) -> Result<Vec<MediaRef>, CatalogError> {
    for attempt in 0..attempts {
        let media = client.get_media(product_id).await?;
        if media.len() >= min_count {
            return Ok(media);
        }
        tracing::debug!(
            product_id,
            attempt,
            visible = media.len(),
            expected = min_count,
            "media not yet visible — polling again"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
    Err(CatalogError::MediaTimeout {
        product_id: product_id.to_string(),
        attempts,
    })
}
