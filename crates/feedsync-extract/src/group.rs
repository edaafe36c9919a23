use std::collections::HashMap;

use feedsync_core::{NormalizedVariant, VariantGroup};

use crate::normalize::normalize;

/// Buckets normalized variants by model key, preserving feed order both for
/// groups (first appearance) and for members within a group.
///
/// Every item lands in exactly one group: variants without a derivable model
/// key fall back to the feed-provided group hint, then to the normalized
/// model title. Nothing is dropped at this stage.
#[must_use]
pub fn group_variants(variants: Vec<NormalizedVariant>) -> Vec<VariantGroup> {
    let mut groups: Vec<VariantGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for variant in variants {
        let key = bucket_key(&variant);
        match index.get(&key) {
            Some(&i) => groups[i].variants.push(variant),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(VariantGroup {
                    key,
                    variants: vec![variant],
                });
            }
        }
    }

    groups
}

fn bucket_key(variant: &NormalizedVariant) -> String {
    if !variant.model_key.is_empty() {
        return variant.model_key.clone();
    }
    if let Some(hint) = variant.group_hint.as_deref() {
        let hint = hint.trim();
        if !hint.is_empty() {
            return hint.to_string();
        }
    }
    normalize(&variant.model_title)
}
