use feedsync_catalog::ShopifyAdminClient;
use feedsync_core::AppConfig;
use feedsync_sync::{RunContext, SyncOrchestrator, TracingSink};

/// Runs one reconciliation against the configured shop.
///
/// Ctrl-C requests cooperative cancellation: the in-flight batch finishes,
/// remaining groups are skipped, and the run reports a cancellation
/// summary.
pub(crate) async fn run(config: &AppConfig, feed_url: Option<String>) -> anyhow::Result<()> {
    let feed_url = crate::resolve_feed_url(config, feed_url)?;

    let client = ShopifyAdminClient::new(
        &config.shop_domain,
        &config.admin_token,
        &config.api_version,
        config.request_timeout_secs,
        config.max_retries,
        config.retry_base_delay_ms,
    )?;

    let ctx = RunContext::new();
    let cancel = ctx.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received — finishing in-flight groups, then stopping");
            cancel.request_cancel();
        }
    });

    let sink = TracingSink;
    let orchestrator = SyncOrchestrator::new(&client, config, &sink, &ctx);
    let summary = orchestrator.run(&feed_url).await?;

    println!(
        "{status:?}: {processed}/{total} groups ({errored_groups} failed) — \
         variants created {created}, updated {updated}, skipped {skipped}, errored {errored}",
        status = summary.status,
        processed = summary.groups_processed,
        total = summary.groups_total,
        errored_groups = summary.groups_errored,
        created = summary.variants_created,
        updated = summary.variants_updated,
        skipped = summary.variants_skipped,
        errored = summary.variants_errored,
    );

    Ok(())
}
