use feedsync_core::AppConfig;
use feedsync_extract::{derive_variant, group_variants};
use feedsync_feed::{fetch_feed, parse_feed};

/// Downloads and groups the feed locally, printing one block per detected
/// model. Useful for checking the grouping heuristics against a live feed
/// before touching the catalog.
pub(crate) async fn run(config: &AppConfig, feed_url: Option<String>) -> anyhow::Result<()> {
    let feed_url = crate::resolve_feed_url(config, feed_url)?;

    let xml = fetch_feed(&feed_url, config.feed_timeout_secs, config.feed_fetch_retries).await?;
    let items = parse_feed(&xml)?;
    let variants: Vec<_> = items.iter().map(derive_variant).collect();
    let groups = group_variants(variants);

    println!("===== MODELS DETECTED =====");
    println!("{} models from {} items\n", groups.len(), items.len());

    for group in &groups {
        println!("Model: {}", group.title());
        println!("key:   {}", group.key);
        println!("Variants:");
        for v in &group.variants {
            let price = v
                .price
                .map_or_else(|| "NO PRICE".to_string(), |p| p.to_string());
            println!(
                "  - {} / {} / {} (SKU {}, {price})",
                v.capacity,
                v.color,
                v.condition.display_name(),
                v.sku,
            );
        }
        println!("----\n");
    }

    Ok(())
}
