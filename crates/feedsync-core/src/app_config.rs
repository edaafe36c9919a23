#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide configuration, loaded once at startup from `FEEDSYNC_*`
/// environment variables.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Shop domain the Admin API client talks to, e.g. `my-shop.myshopify.com`.
    pub shop_domain: String,
    /// Admin API access token. Redacted in the `Debug` impl.
    pub admin_token: String,
    /// Admin GraphQL API version path segment, e.g. `2024-10`.
    pub api_version: String,
    /// Default feed URL for CLI runs; individual runs may override it.
    pub feed_url: Option<String>,
    /// Constant vendor stamped on every product draft.
    pub vendor: String,
    /// Names of the publication channels products are published to.
    pub publication_channels: Vec<String>,
    pub feed_timeout_secs: u64,
    /// Additional feed download attempts after the first failure.
    pub feed_fetch_retries: u32,
    pub request_timeout_secs: u64,
    /// Number of variant groups processed concurrently per batch.
    pub batch_size: usize,
    /// Mandatory pause between batches, in milliseconds.
    pub inter_batch_delay_ms: u64,
    /// Per-call retry attempts after the first failure.
    pub max_retries: u32,
    /// Backoff base delay; throttled errors multiply this by 4.
    pub retry_base_delay_ms: u64,
    pub media_poll_attempts: u32,
    pub media_poll_delay_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("shop_domain", &self.shop_domain)
            .field("admin_token", &"[redacted]")
            .field("api_version", &self.api_version)
            .field("feed_url", &self.feed_url)
            .field("vendor", &self.vendor)
            .field("publication_channels", &self.publication_channels)
            .field("feed_timeout_secs", &self.feed_timeout_secs)
            .field("feed_fetch_retries", &self.feed_fetch_retries)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("batch_size", &self.batch_size)
            .field("inter_batch_delay_ms", &self.inter_batch_delay_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .field("media_poll_attempts", &self.media_poll_attempts)
            .field("media_poll_delay_ms", &self.media_poll_delay_ms)
            .finish()
    }
}
