//! Builds the target product shape for a variant group.

use std::collections::BTreeSet;
use std::collections::HashSet;

use rust_decimal::Decimal;

use feedsync_catalog::{OptionValuePair, ProductMeta, ProductOptionInput, VariantPayload};
use feedsync_core::{Availability, Condition, NormalizedVariant, VariantGroup};

use crate::matcher::handle_for_key;

pub const OPTION_CAPACITY: &str = "Capacidad";
pub const OPTION_COLOR: &str = "Color";
pub const OPTION_CONDITION: &str = "Condición";

/// One variant of the draft, addressable by its option-value combination.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftVariant {
    pub sku: String,
    pub barcode: Option<String>,
    pub price: Decimal,
    pub capacity: String,
    /// `Some` only when the group carries a Color axis; colorless variants
    /// in such a group hold the sentinel value.
    pub color: Option<String>,
    pub condition: Condition,
    pub image_url: Option<String>,
}

impl DraftVariant {
    /// Option values in axis order: Color (when present), Capacidad,
    /// Condición.
    #[must_use]
    pub fn option_values(&self) -> Vec<OptionValuePair> {
        let mut values = Vec::with_capacity(3);
        if let Some(color) = &self.color {
            values.push(OptionValuePair {
                option_name: OPTION_COLOR.to_string(),
                value: color.clone(),
            });
        }
        values.push(OptionValuePair {
            option_name: OPTION_CAPACITY.to_string(),
            value: self.capacity.clone(),
        });
        values.push(OptionValuePair {
            option_name: OPTION_CONDITION.to_string(),
            value: self.condition.display_name().to_string(),
        });
        values
    }

    /// Human-readable option summary for events, e.g. `"rojo / 128GB / Nuevo"`.
    #[must_use]
    pub fn options_summary(&self) -> String {
        self.option_values()
            .iter()
            .map(|ov| ov.value.clone())
            .collect::<Vec<_>>()
            .join(" / ")
    }

    /// Identity of the full option tuple: two variants with equal keys are
    /// duplicates. Pairs are case/whitespace-normalized and sorted so
    /// neither axis order nor spelling quirks affect identity.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        let mut pairs: Vec<String> = self
            .option_values()
            .iter()
            .map(|ov| {
                format!(
                    "{}:{}",
                    normalize_value(&ov.option_name),
                    normalize_value(&ov.value)
                )
            })
            .collect();
        pairs.sort();
        pairs.join("|")
    }

    /// Converts to the catalog's bulk-mutation input.
    #[must_use]
    pub fn to_payload(
        &self,
        remote_id: Option<String>,
        media_id: Option<String>,
    ) -> VariantPayload {
        VariantPayload {
            remote_id,
            sku: Some(self.sku.clone()),
            barcode: self.barcode.clone(),
            price: self.price,
            option_values: self.option_values(),
            media_id,
        }
    }
}

pub(crate) fn normalize_value(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// The locally-computed target shape of a product before reconciliation
/// with remote state.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub group_key: String,
    pub meta: ProductMeta,
    pub variants: Vec<DraftVariant>,
    /// Unique image URLs across the group, in feed order.
    pub image_urls: Vec<String>,
}

/// Assembles the draft for one group.
///
/// Option axes: Capacidad and Condición are always present; Color only
/// when at least one member carries a real (non-sentinel) color, in which
/// case colorless members take the sentinel as their value. Items without
/// a price are excluded here (the orchestrator already accounted for
/// them). Duplicate option combinations keep the first occurrence in feed
/// order — feeds legitimately contain redundant rows.
#[must_use]
pub fn build_draft(group: &VariantGroup, vendor: &str) -> ProductDraft {
    let base = base_item(group);
    let has_color_axis = group.variants.iter().any(NormalizedVariant::has_real_color);

    let sellable: Vec<&NormalizedVariant> = group
        .variants
        .iter()
        .filter(|v| v.price.is_some())
        .collect();

    // Unique axis values, insertion order.
    let mut capacities = Vec::new();
    let mut colors = Vec::new();
    let mut conditions = Vec::new();
    for v in &sellable {
        push_unique(&mut capacities, v.capacity.clone());
        if has_color_axis {
            push_unique(&mut colors, v.color.clone());
        }
        push_unique(&mut conditions, v.condition.display_name().to_string());
    }

    let mut options = Vec::new();
    if has_color_axis {
        options.push(ProductOptionInput {
            name: OPTION_COLOR.to_string(),
            values: colors,
        });
    }
    options.push(ProductOptionInput {
        name: OPTION_CAPACITY.to_string(),
        values: capacities,
    });
    options.push(ProductOptionInput {
        name: OPTION_CONDITION.to_string(),
        values: conditions,
    });

    // Tag union across the group, order-insensitive.
    let mut tags = BTreeSet::new();
    for v in &group.variants {
        if !v.brand.trim().is_empty() {
            let brand_tag = if v.brand.eq_ignore_ascii_case("apple") {
                "Apple"
            } else {
                "Android"
            };
            tags.insert(brand_tag.to_string());
        }
        tags.insert(v.condition.tag().to_string());
        if v.availability == Availability::Preorder {
            tags.insert("preorder".to_string());
        }
    }

    // Images deduplicated by URL, feed order.
    let mut image_urls = Vec::new();
    let mut seen_urls = HashSet::new();
    for v in &group.variants {
        if let Some(url) = &v.image_url {
            if seen_urls.insert(url.clone()) {
                image_urls.push(url.clone());
            }
        }
    }

    // Variants, deduplicated by full option tuple — first in feed order wins.
    let mut variants: Vec<DraftVariant> = Vec::new();
    let mut seen_keys = HashSet::new();
    for v in sellable {
        let Some(price) = v.price else { continue };
        let draft_variant = DraftVariant {
            sku: v.sku.clone(),
            barcode: v.gtin.clone(),
            price,
            capacity: v.capacity.clone(),
            color: has_color_axis.then(|| v.color.clone()),
            condition: v.condition,
            image_url: v.image_url.clone(),
        };
        let key = draft_variant.dedup_key();
        if seen_keys.insert(key) {
            variants.push(draft_variant);
        } else {
            tracing::debug!(
                group_key = %group.key,
                sku = %draft_variant.sku,
                options = %draft_variant.options_summary(),
                "dropping duplicate option combination"
            );
        }
    }

    ProductDraft {
        group_key: group.key.clone(),
        meta: ProductMeta {
            title: base.model_title.clone(),
            vendor: vendor.to_string(),
            description_html: base.description.clone(),
            handle: handle_for_key(&group.key),
            product_type: base.category.clone(),
            tags: tags.into_iter().collect(),
            options,
        },
        variants,
        image_urls,
    }
}

/// Picks the item the draft's title and description come from: in-stock
/// first, then lowest price, then alphabetical title. Ties keep feed order.
fn base_item(group: &VariantGroup) -> &NormalizedVariant {
    group
        .variants
        .iter()
        .min_by(|a, b| {
            let a_out = a.availability != Availability::InStock;
            let b_out = b.availability != Availability::InStock;
            a_out
                .cmp(&b_out)
                .then_with(|| price_or_max(a).cmp(&price_or_max(b)))
                .then_with(|| a.model_title.cmp(&b.model_title))
        })
        .unwrap_or(&group.variants[0])
}

fn price_or_max(v: &NormalizedVariant) -> Decimal {
    v.price.unwrap_or(Decimal::MAX)
}

fn push_unique(values: &mut Vec<String>, value: String) {
    if !values.contains(&value) {
        values.push(value);
    }
}
