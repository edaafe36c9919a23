use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let shop_domain = require("FEEDSYNC_SHOP_DOMAIN")?;
    let admin_token = require("FEEDSYNC_ADMIN_TOKEN")?;

    let env = parse_environment(&or_default("FEEDSYNC_ENV", "development"));
    let log_level = or_default("FEEDSYNC_LOG_LEVEL", "info");
    let api_version = or_default("FEEDSYNC_API_VERSION", "2024-10");
    let feed_url = lookup("FEEDSYNC_FEED_URL").ok();
    let vendor = or_default("FEEDSYNC_VENDOR", "Secondtech");

    let publication_channels = or_default("FEEDSYNC_PUBLICATION_CHANNELS", "Online Store,Shop")
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    let feed_timeout_secs = parse_u64("FEEDSYNC_FEED_TIMEOUT_SECS", "30")?;
    let feed_fetch_retries = parse_u32("FEEDSYNC_FEED_FETCH_RETRIES", "2")?;
    let request_timeout_secs = parse_u64("FEEDSYNC_REQUEST_TIMEOUT_SECS", "30")?;
    let batch_size = parse_usize("FEEDSYNC_BATCH_SIZE", "3")?;
    let inter_batch_delay_ms = parse_u64("FEEDSYNC_INTER_BATCH_DELAY_MS", "500")?;
    let max_retries = parse_u32("FEEDSYNC_MAX_RETRIES", "3")?;
    let retry_base_delay_ms = parse_u64("FEEDSYNC_RETRY_BASE_DELAY_MS", "150")?;
    let media_poll_attempts = parse_u32("FEEDSYNC_MEDIA_POLL_ATTEMPTS", "5")?;
    let media_poll_delay_ms = parse_u64("FEEDSYNC_MEDIA_POLL_DELAY_MS", "1000")?;

    Ok(AppConfig {
        env,
        log_level,
        shop_domain,
        admin_token,
        api_version,
        feed_url,
        vendor,
        publication_channels,
        feed_timeout_secs,
        feed_fetch_retries,
        request_timeout_secs,
        batch_size,
        inter_batch_delay_ms,
        max_retries,
        retry_base_delay_ms,
        media_poll_attempts,
        media_poll_delay_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    /// Returns a map with all required env vars populated with valid defaults.
    fn full_env<'a>() -> HashMap<&'a str, &'a str> {
        let mut m = HashMap::new();
        m.insert("FEEDSYNC_SHOP_DOMAIN", "test-shop.myshopify.com");
        m.insert("FEEDSYNC_ADMIN_TOKEN", "shpat_test");
        m
    }

    #[test]
    fn parse_environment_production() {
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("staging"), Environment::Development);
    }

    #[test]
    fn build_app_config_fails_without_shop_domain() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "FEEDSYNC_SHOP_DOMAIN"),
            "expected MissingEnvVar(FEEDSYNC_SHOP_DOMAIN), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_without_admin_token() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("FEEDSYNC_SHOP_DOMAIN", "test-shop.myshopify.com");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "FEEDSYNC_ADMIN_TOKEN"),
            "expected MissingEnvVar(FEEDSYNC_ADMIN_TOKEN), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_succeeds_with_all_required_vars() {
        let map = full_env();
        let result = build_app_config(lookup_from_map(&map));
        assert!(result.is_ok(), "expected Ok, got: {result:?}");
        let cfg = result.unwrap();
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.shop_domain, "test-shop.myshopify.com");
        assert_eq!(cfg.api_version, "2024-10");
        assert_eq!(cfg.vendor, "Secondtech");
        assert_eq!(cfg.publication_channels, vec!["Online Store", "Shop"]);
        assert_eq!(cfg.feed_timeout_secs, 30);
        assert_eq!(cfg.feed_fetch_retries, 2);
        assert_eq!(cfg.batch_size, 3);
        assert_eq!(cfg.inter_batch_delay_ms, 500);
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.retry_base_delay_ms, 150);
        assert_eq!(cfg.media_poll_attempts, 5);
        assert_eq!(cfg.media_poll_delay_ms, 1000);
        assert!(cfg.feed_url.is_none());
    }

    #[test]
    fn build_app_config_splits_publication_channels() {
        let mut map = full_env();
        map.insert(
            "FEEDSYNC_PUBLICATION_CHANNELS",
            "Online Store, Shop , Point of Sale",
        );
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(
            cfg.publication_channels,
            vec!["Online Store", "Shop", "Point of Sale"]
        );
    }

    #[test]
    fn build_app_config_batch_size_override() {
        let mut map = full_env();
        map.insert("FEEDSYNC_BATCH_SIZE", "6");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.batch_size, 6);
    }

    #[test]
    fn build_app_config_batch_size_invalid() {
        let mut map = full_env();
        map.insert("FEEDSYNC_BATCH_SIZE", "many");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FEEDSYNC_BATCH_SIZE"),
            "expected InvalidEnvVar(FEEDSYNC_BATCH_SIZE), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_retry_base_delay_override() {
        let mut map = full_env();
        map.insert("FEEDSYNC_RETRY_BASE_DELAY_MS", "300");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.retry_base_delay_ms, 300);
    }

    #[test]
    fn build_app_config_feed_url_is_optional() {
        let mut map = full_env();
        map.insert("FEEDSYNC_FEED_URL", "https://example.com/feed.xml");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.feed_url.as_deref(), Some("https://example.com/feed.xml"));
    }

    #[test]
    fn debug_redacts_admin_token() {
        let map = full_env();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("shpat_test"));
        assert!(rendered.contains("[redacted]"));
    }
}
