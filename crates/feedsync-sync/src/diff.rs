//! Classifies draft variants against remote state as create/update/skip.

use std::collections::HashMap;
use std::collections::HashSet;

use feedsync_catalog::{RemoteProduct, RemoteVariant};

use crate::draft::{normalize_value, DraftVariant, ProductDraft};

/// A draft variant that already exists remotely but differs in some field.
#[derive(Debug, Clone)]
pub struct VariantUpdate {
    pub variant: DraftVariant,
    /// Remote variant id the update applies to.
    pub remote_id: String,
}

/// Result of diffing one draft against its matched remote product.
#[derive(Debug, Clone, Default)]
pub struct VariantDiff {
    pub to_create: Vec<DraftVariant>,
    pub to_update: Vec<VariantUpdate>,
    pub to_skip: Vec<DraftVariant>,
}

/// Matches each draft variant against the remote product's variants and
/// classifies it.
///
/// Match priority: exact SKU, then exact barcode, then exact option-tuple
/// equality. SKU first is deliberate — it is the most stable identity key
/// across re-imports even if the option derivation heuristics change;
/// option-tuple matching is the fallback for legacy remote data without
/// SKUs. A matched variant whose price, SKU, barcode, assigned media, or
/// option tuple differs becomes an update; an identical one a skip; an
/// unmatched one a create.
#[must_use]
pub fn diff_variants(existing: &RemoteProduct, draft: &ProductDraft) -> VariantDiff {
    // Remote media URL → id, for deciding whether a variant's image
    // assignment changed.
    let media_by_url: HashMap<&str, &str> = existing
        .media
        .iter()
        .filter_map(|m| m.url.as_deref().map(|url| (url, m.id.as_str())))
        .collect();

    let mut diff = VariantDiff::default();
    let mut claimed: HashSet<&str> = HashSet::new();

    for variant in &draft.variants {
        match find_match(existing, variant, &claimed) {
            Some(remote) => {
                claimed.insert(remote.id.as_str());
                if differs(remote, variant, &media_by_url) {
                    diff.to_update.push(VariantUpdate {
                        variant: variant.clone(),
                        remote_id: remote.id.clone(),
                    });
                } else {
                    diff.to_skip.push(variant.clone());
                }
            }
            None => diff.to_create.push(variant.clone()),
        }
    }

    diff
}

fn find_match<'a>(
    existing: &'a RemoteProduct,
    variant: &DraftVariant,
    claimed: &HashSet<&str>,
) -> Option<&'a RemoteVariant> {
    let available = || {
        existing
            .variants
            .iter()
            .filter(|r| !claimed.contains(r.id.as_str()))
    };

    if !variant.sku.trim().is_empty() {
        if let Some(found) = available().find(|r| r.sku.as_deref() == Some(variant.sku.as_str())) {
            return Some(found);
        }
    }

    if let Some(barcode) = &variant.barcode {
        if let Some(found) = available().find(|r| r.barcode.as_deref() == Some(barcode.as_str())) {
            return Some(found);
        }
    }

    available().find(|r| option_tuples_equal(r, variant))
}

fn option_tuples_equal(remote: &RemoteVariant, variant: &DraftVariant) -> bool {
    let remote_tuple: HashSet<(String, String)> = remote
        .selected_options
        .iter()
        .map(|o| (normalize_value(&o.name), normalize_value(&o.value)))
        .collect();
    let draft_tuple: HashSet<(String, String)> = variant
        .option_values()
        .iter()
        .map(|o| (normalize_value(&o.option_name), normalize_value(&o.value)))
        .collect();
    remote_tuple == draft_tuple
}

fn differs(
    remote: &RemoteVariant,
    variant: &DraftVariant,
    media_by_url: &HashMap<&str, &str>,
) -> bool {
    if remote.price != Some(variant.price) {
        return true;
    }
    if remote.sku.as_deref() != Some(variant.sku.as_str()) {
        return true;
    }
    // Barcode only counts when the draft has one; a feed without GTINs
    // must not clear remote barcodes.
    if let Some(barcode) = &variant.barcode {
        if remote.barcode.as_deref() != Some(barcode.as_str()) {
            return true;
        }
    }
    // Media only counts when the draft image already exists remotely and
    // is assigned to a different media id.
    if let Some(desired) = variant
        .image_url
        .as_deref()
        .and_then(|url| media_by_url.get(url))
    {
        if remote.media_id.as_deref() != Some(*desired) {
            return true;
        }
    }
    !option_tuples_equal(remote, variant)
}

#[cfg(test)]
mod tests {
    use feedsync_catalog::{MediaRef, SelectedOption};
    use feedsync_core::Condition;
    use rust_decimal::Decimal;

    use crate::draft::{OPTION_CAPACITY, OPTION_CONDITION};

    use super::*;

    fn draft_variant(sku: &str, price: i64) -> DraftVariant {
        DraftVariant {
            sku: sku.to_string(),
            barcode: None,
            price: Decimal::new(price * 100, 2),
            capacity: "128GB".to_string(),
            color: None,
            condition: Condition::New,
            image_url: None,
        }
    }

    fn remote_variant(id: &str, sku: &str, price: i64) -> RemoteVariant {
        RemoteVariant {
            id: id.to_string(),
            sku: Some(sku.to_string()),
            barcode: None,
            price: Some(Decimal::new(price * 100, 2)),
            selected_options: vec![
                SelectedOption {
                    name: OPTION_CAPACITY.to_string(),
                    value: "128GB".to_string(),
                },
                SelectedOption {
                    name: OPTION_CONDITION.to_string(),
                    value: "Nuevo".to_string(),
                },
            ],
            media_id: None,
        }
    }

    fn product(variants: Vec<RemoteVariant>) -> RemoteProduct {
        RemoteProduct {
            id: "gid://shopify/Product/1".to_string(),
            title: "Acme Phone".to_string(),
            handle: "acme-phone".to_string(),
            tags: vec![],
            variants,
            media: vec![],
        }
    }

    fn draft(variants: Vec<DraftVariant>) -> ProductDraft {
        ProductDraft {
            group_key: "acme phone".to_string(),
            meta: feedsync_catalog::ProductMeta {
                title: "Acme Phone".to_string(),
                vendor: "Secondtech".to_string(),
                description_html: String::new(),
                handle: "acme-phone".to_string(),
                product_type: String::new(),
                tags: vec![],
                options: vec![],
            },
            variants,
            image_urls: vec![],
        }
    }

    #[test]
    fn identical_variant_is_skip() {
        let diff = diff_variants(
            &product(vec![remote_variant("r1", "A", 10)]),
            &draft(vec![draft_variant("A", 10)]),
        );
        assert_eq!(diff.to_skip.len(), 1);
        assert!(diff.to_create.is_empty());
        assert!(diff.to_update.is_empty());
    }

    #[test]
    fn price_change_is_update_with_remote_id() {
        let diff = diff_variants(
            &product(vec![remote_variant("r1", "A", 10)]),
            &draft(vec![draft_variant("A", 12)]),
        );
        assert_eq!(diff.to_update.len(), 1);
        assert_eq!(diff.to_update[0].remote_id, "r1");
    }

    #[test]
    fn no_match_is_create() {
        let mut other = draft_variant("B", 10);
        other.capacity = "256GB".to_string();
        let diff = diff_variants(
            &product(vec![remote_variant("r1", "A", 10)]),
            &draft(vec![other]),
        );
        assert_eq!(diff.to_create.len(), 1);
        assert!(diff.to_update.is_empty());
        assert!(diff.to_skip.is_empty());
    }

    #[test]
    fn sku_match_wins_over_option_tuple() {
        // Remote has two variants; the draft SKU matches the second even
        // though the first has the same option tuple.
        let mut first = remote_variant("r1", "OTHER", 10);
        first.selected_options[0].value = "128GB".to_string();
        let second = remote_variant("r2", "A", 10);
        let diff = diff_variants(
            &product(vec![first, second]),
            &draft(vec![draft_variant("A", 10)]),
        );
        assert_eq!(diff.to_skip.len(), 1);
        // If it had matched r1, the sku difference would have made it an update.
        assert!(diff.to_update.is_empty());
    }

    #[test]
    fn barcode_match_is_second_priority() {
        let mut remote = remote_variant("r1", "REMOTE-SKU", 10);
        remote.barcode = Some("12345678".to_string());
        let mut variant = draft_variant("FEED-SKU", 10);
        variant.barcode = Some("12345678".to_string());

        let diff = diff_variants(&product(vec![remote]), &draft(vec![variant]));
        // Matched by barcode, but the sku differs → update.
        assert_eq!(diff.to_update.len(), 1);
        assert_eq!(diff.to_update[0].remote_id, "r1");
    }

    #[test]
    fn legacy_remote_without_sku_matches_by_option_tuple() {
        let mut remote = remote_variant("r1", "", 10);
        remote.sku = None;
        let diff = diff_variants(
            &product(vec![remote]),
            &draft(vec![draft_variant("A", 10)]),
        );
        // Option tuple matched; sku differs (None vs "A") → update.
        assert_eq!(diff.to_update.len(), 1);
    }

    #[test]
    fn missing_draft_barcode_does_not_force_update() {
        let mut remote = remote_variant("r1", "A", 10);
        remote.barcode = Some("99999999".to_string());
        let diff = diff_variants(&product(vec![remote]), &draft(vec![draft_variant("A", 10)]));
        assert_eq!(diff.to_skip.len(), 1);
    }

    #[test]
    fn media_reassignment_is_update() {
        let mut remote = remote_variant("r1", "A", 10);
        remote.media_id = Some("media-old".to_string());
        let mut remote_product = product(vec![remote]);
        remote_product.media = vec![MediaRef {
            id: "media-new".to_string(),
            url: Some("https://cdn/new.jpg".to_string()),
        }];

        let mut variant = draft_variant("A", 10);
        variant.image_url = Some("https://cdn/new.jpg".to_string());

        let diff = diff_variants(&remote_product, &draft(vec![variant]));
        assert_eq!(diff.to_update.len(), 1);
    }

    #[test]
    fn each_remote_variant_matches_at_most_once() {
        // Two identical draft rows must not both claim the same remote
        // variant; the second becomes a create.
        let diff = diff_variants(
            &product(vec![remote_variant("r1", "A", 10)]),
            &draft(vec![draft_variant("A", 10), draft_variant("A", 10)]),
        );
        assert_eq!(diff.to_skip.len(), 1);
        assert_eq!(diff.to_create.len(), 1);
    }
}
