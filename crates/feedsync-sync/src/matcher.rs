//! Finds the remote product a variant group reconciles against.

use feedsync_catalog::{CatalogApi, RemoteProduct};

/// Longest handle the catalog accepts.
const MAX_HANDLE_LEN: usize = 255;

/// Derives the catalog handle for a model key: non-word runs become single
/// hyphens, bounded length, no leading/trailing hyphen.
///
/// This is the stability anchor of the whole sync: a product created for
/// model key K carries this handle, so the same K finds it again on every
/// later run.
#[must_use]
pub fn handle_for_key(model_key: &str) -> String {
    let mut handle = String::with_capacity(model_key.len());
    let mut last_was_hyphen = true;
    for c in model_key.chars() {
        if c.is_alphanumeric() {
            handle.extend(c.to_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            handle.push('-');
            last_was_hyphen = true;
        }
    }
    while handle.ends_with('-') {
        handle.pop();
    }
    handle.truncate(MAX_HANDLE_LEN);
    handle
}

/// Queries the catalog for an existing product matching the group.
///
/// The handle derived from the model key is the canonical lookup; SKU and
/// title queries are fallbacks for products that predate this sync or were
/// created by hand. Catalog errors degrade to "not found" — a false miss
/// only risks a duplicate-create attempt (which the handle collision then
/// rejects), not data loss — and are reported at WARN, not swallowed.
pub async fn find_existing<C: CatalogApi>(
    client: &C,
    model_key: &str,
    first_sku: &str,
    title: &str,
) -> Option<RemoteProduct> {
    let handle = handle_for_key(model_key);

    let mut queries = Vec::new();
    if !handle.is_empty() {
        queries.push(format!("handle:{handle}"));
    }
    if !first_sku.trim().is_empty() {
        queries.push(format!("sku:{}", first_sku.trim()));
    }
    if !title.trim().is_empty() {
        queries.push(format!("title:{}", sanitize_query_value(title)));
    }

    for query in queries {
        match client.search_products(&query).await {
            Ok(products) => {
                if let Some(product) = products.into_iter().next() {
                    tracing::debug!(%query, product_id = %product.id, "existing product matched");
                    return Some(product);
                }
            }
            Err(err) => {
                tracing::warn!(
                    %query,
                    error = %err,
                    "catalog search failed — treating as not found"
                );
            }
        }
    }

    None
}

/// Strips characters that would break a catalog search query string.
fn sanitize_query_value(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '"' | '\'' | '\n' | '\r' | '\t' | ':' => ' ',
            other => other,
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
