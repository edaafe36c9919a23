use std::time::Duration;

use reqwest::Client;

use crate::error::FeedError;

/// Downloads the feed document with a bounded timeout and a small run-level
/// retry on transient failures.
///
/// `retries` is the number of additional attempts after the first failure;
/// between attempts the fetch sleeps `500ms * 2^attempt`. Only network
/// errors and 5xx responses are retried — a 4xx means the URL itself is
/// wrong and retrying cannot help.
///
/// # Errors
///
/// - [`FeedError::Http`] on network failure after all retries.
/// - [`FeedError::Status`] for a non-2xx response after all retries.
pub async fn fetch_feed(url: &str, timeout_secs: u64, retries: u32) -> Result<String, FeedError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent("feedsync/0.1 (catalog-sync)")
        .build()?;

    let mut attempt = 0u32;
    loop {
        match fetch_once(&client, url).await {
            Ok(body) => return Ok(body),
            Err(err) => {
                if !is_retriable(&err) || attempt >= retries {
                    return Err(err);
                }
                let delay_ms = 500u64.saturating_mul(1 << attempt.min(10));
                tracing::warn!(
                    attempt,
                    retries,
                    delay_ms,
                    error = %err,
                    "transient feed fetch error — retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                attempt += 1;
            }
        }
    }
}

fn is_retriable(err: &FeedError) -> bool {
    match err {
        FeedError::Http(e) => e.is_timeout() || e.is_connect(),
        FeedError::Status { status, .. } => *status >= 500,
        FeedError::Xml(_) => false,
    }
}

async fn fetch_once(client: &Client, url: &str) -> Result<String, FeedError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.text().await?)
}
