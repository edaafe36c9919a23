use std::sync::LazyLock;

use regex::Regex;

use feedsync_core::{
    Availability, Condition, NormalizedVariant, CAPACITY_DEFAULT, COLOR_SENTINEL,
};
use feedsync_feed::FeedItem;

use crate::normalize::normalize;
use crate::rules::apply_pipeline;

static CAPACITY_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,4})\s?(gb|tb)\b").expect("valid regex"));

/// Derives the cleaned display title for a product model.
///
/// Applies the rewrite pipeline to the raw title, prefixes the brand when it
/// is not already a case-insensitive prefix, and re-title-cases each word
/// (first letter upper, rest untouched so acronyms like `FE` survive).
///
/// An empty result falls back to the trimmed brand.
#[must_use]
pub fn extract_model_title(title: &str, brand: &str) -> String {
    let body = apply_pipeline(title);
    let brand = brand.trim();

    let prefixed = if body.is_empty() {
        brand.to_string()
    } else if !brand.is_empty()
        && !body.to_lowercase().starts_with(&brand.to_lowercase())
    {
        format!("{brand} {body}")
    } else {
        body
    };

    prefixed
        .split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The canonical grouping key: [`normalize`] applied to the model title.
///
/// Deterministic and pure — the single source of truth for "same product"
/// across runs.
#[must_use]
pub fn extract_model_key(title: &str, brand: &str) -> String {
    normalize(&extract_model_title(title, brand))
}

/// Extracts a capacity token (`"512GB"`, `"1TB"`) from a title, normalizing
/// unit case and dropping the internal space.
#[must_use]
pub fn extract_capacity(title: &str) -> Option<String> {
    CAPACITY_TOKEN_RE.captures(title).map(|caps| {
        let number = &caps[1];
        let unit = caps[2].to_uppercase();
        format!("{number}{unit}")
    })
}

/// Builds a [`NormalizedVariant`] from one parsed feed item.
///
/// Color comes from the explicit feed field only (never guessed from the
/// title), lowercased, with [`COLOR_SENTINEL`] standing in when absent.
/// Capacity defaults to [`CAPACITY_DEFAULT`] when no token is found. GTINs
/// shorter than 8 digits or containing non-digits are dropped.
#[must_use]
pub fn derive_variant(item: &FeedItem) -> NormalizedVariant {
    let model_title = extract_model_title(&item.raw_title, &item.brand);
    let model_key = normalize(&model_title);

    let capacity = extract_capacity(&item.raw_title)
        .unwrap_or_else(|| CAPACITY_DEFAULT.to_string());

    let color = {
        let trimmed = item.raw_color.trim();
        if trimmed.is_empty() {
            COLOR_SENTINEL.to_string()
        } else {
            trimmed.to_lowercase()
        }
    };

    let gtin = item
        .gtin
        .as_deref()
        .map(str::trim)
        .filter(|g| g.len() >= 8 && g.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string);

    NormalizedVariant {
        sku: item.sku.clone(),
        model_title,
        model_key,
        group_hint: item.group_id_hint.clone(),
        capacity,
        color,
        condition: Condition::parse(&item.raw_condition),
        price: item.price,
        image_url: item.image_url.clone(),
        gtin,
        brand: item.brand.clone(),
        description: item.description.clone(),
        category: item.category.clone(),
        availability: Availability::parse(&item.raw_availability),
    }
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_title_strips_capacity_color_and_translation() {
        assert_eq!(
            extract_model_title("Samsung Galaxy S23 Ultra 512Gb Sky Blue (Azul)", "Samsung"),
            "Samsung Galaxy S23 Ultra"
        );
    }

    #[test]
    fn model_title_handles_pixel_lineup() {
        assert_eq!(
            extract_model_title("Google Pixel 10 128GB Obsidian (Negro)", "Google"),
            "Google Pixel 10"
        );
        assert_eq!(
            extract_model_title("Google Pixel 10 Pro 256GB Obsidiana (Negro)", "Google"),
            "Google Pixel 10 Pro"
        );
        assert_eq!(
            extract_model_title("Google Pixel 9 Pro Fold 512GB Black (Negro)", "Google"),
            "Google Pixel 9 Pro Fold"
        );
    }

    #[test]
    fn model_title_keeps_glued_suffix_as_separate_token() {
        assert_eq!(
            extract_model_title("Samsung Galaxy S25FE 128GB Black (Negro)", "Samsung"),
            "Samsung Galaxy S25 FE"
        );
    }

    #[test]
    fn model_title_prefixes_missing_brand() {
        assert_eq!(
            extract_model_title("Pixel 8a 256GB Black (Negro)", "Google"),
            "Google Pixel 8a"
        );
    }

    #[test]
    fn model_title_does_not_duplicate_brand_prefix() {
        let title = extract_model_title("samsung galaxy s23 256gb", "Samsung");
        assert_eq!(title, "Samsung Galaxy S23");
    }

    #[test]
    fn model_title_empty_title_falls_back_to_brand() {
        assert_eq!(extract_model_title("", "Apple"), "Apple");
    }

    #[test]
    fn model_key_is_stable_across_capacity_and_color() {
        let a = extract_model_key("Google Pixel 10 128GB Obsidian (Negro)", "Google");
        let b = extract_model_key("Google Pixel 10 256GB Porcelain (Blanco)", "Google");
        assert_eq!(a, b);
        assert_eq!(a, "google pixel 10");
    }

    #[test]
    fn model_key_differs_between_base_and_pro() {
        let base = extract_model_key("Google Pixel 10 128GB Obsidian (Negro)", "Google");
        let pro = extract_model_key("Google Pixel 10 Pro 128GB Obsidiana (Negro)", "Google");
        assert_ne!(base, pro);
    }

    #[test]
    fn model_key_unifies_flip_spellings() {
        let a = extract_model_key("Samsung Galaxy flip 4 128GB", "Samsung");
        let b = extract_model_key("Samsung Galaxy zflip4 256GB", "Samsung");
        assert_eq!(a, b);
    }

    #[test]
    fn capacity_token_normalizes_case_and_spacing() {
        assert_eq!(extract_capacity("Pixel 8 256 GB Obsidian").as_deref(), Some("256GB"));
        assert_eq!(extract_capacity("S23 Ultra 512Gb").as_deref(), Some("512GB"));
        assert_eq!(extract_capacity("Disco 1TB").as_deref(), Some("1TB"));
        assert_eq!(extract_capacity("Sin capacidad"), None);
    }

    mod derive {
        use super::*;

        fn item() -> FeedItem {
            FeedItem {
                sku: "5530".to_string(),
                group_id_hint: Some("S23U".to_string()),
                raw_title: "Samsung Galaxy S23 Ultra 512Gb Sky Blue (Azul)".to_string(),
                brand: "Samsung".to_string(),
                description: "<p>desc</p>".to_string(),
                price: Some(rust_decimal::Decimal::new(56900, 2)),
                gtin: Some("8806094931234".to_string()),
                image_url: Some("https://cdn.example.com/a.jpg".to_string()),
                raw_color: "Sky Blue".to_string(),
                raw_availability: "in_stock".to_string(),
                raw_condition: "refurbished".to_string(),
                category: "Smartphones".to_string(),
            }
        }

        #[test]
        fn derive_variant_populates_all_attributes() {
            let v = derive_variant(&item());
            assert_eq!(v.model_title, "Samsung Galaxy S23 Ultra");
            assert_eq!(v.model_key, "samsung galaxy s23 ultra");
            assert_eq!(v.capacity, "512GB");
            assert_eq!(v.color, "sky blue");
            assert_eq!(v.condition, Condition::Refurbished);
            assert_eq!(v.availability, Availability::InStock);
            assert_eq!(v.gtin.as_deref(), Some("8806094931234"));
            assert_eq!(v.group_hint.as_deref(), Some("S23U"));
        }

        #[test]
        fn derive_variant_missing_color_uses_sentinel() {
            let mut i = item();
            i.raw_color = String::new();
            let v = derive_variant(&i);
            assert_eq!(v.color, COLOR_SENTINEL);
            assert!(!v.has_real_color());
        }

        #[test]
        fn derive_variant_missing_capacity_uses_default() {
            let mut i = item();
            i.raw_title = "Samsung Galaxy Buds".to_string();
            let v = derive_variant(&i);
            assert_eq!(v.capacity, CAPACITY_DEFAULT);
        }

        #[test]
        fn derive_variant_rejects_short_or_alpha_gtin() {
            let mut i = item();
            i.gtin = Some("1234".to_string());
            assert!(derive_variant(&i).gtin.is_none());
            i.gtin = Some("ABC1234567".to_string());
            assert!(derive_variant(&i).gtin.is_none());
        }

        #[test]
        fn derive_variant_is_deterministic() {
            let a = derive_variant(&item());
            let b = derive_variant(&item());
            assert_eq!(a.model_key, b.model_key);
            assert_eq!(a.capacity, b.capacity);
            assert_eq!(a.color, b.color);
        }
    }
}
