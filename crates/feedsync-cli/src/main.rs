mod preview;
mod sync;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "feedsync")]
#[command(about = "Sync a Google Shopping product feed into a Shopify catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a full feed-to-catalog reconciliation.
    Sync {
        /// Feed URL; falls back to FEEDSYNC_FEED_URL.
        #[arg(long)]
        feed_url: Option<String>,
    },
    /// Parse and group the feed locally, printing the detected models.
    /// Makes no catalog calls.
    Preview {
        /// Feed URL; falls back to FEEDSYNC_FEED_URL.
        #[arg(long)]
        feed_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = feedsync_core::load_app_config_from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Sync { feed_url } => sync::run(&config, feed_url).await,
        Commands::Preview { feed_url } => preview::run(&config, feed_url).await,
    }
}

/// Resolves the feed URL from the flag or the configured default.
pub(crate) fn resolve_feed_url(
    config: &feedsync_core::AppConfig,
    flag: Option<String>,
) -> anyhow::Result<String> {
    flag.or_else(|| config.feed_url.clone()).ok_or_else(|| {
        anyhow::anyhow!("no feed URL given — pass --feed-url or set FEEDSYNC_FEED_URL")
    })
}
