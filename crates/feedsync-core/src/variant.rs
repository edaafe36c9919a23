use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Capacity value used when no capacity token is found in a title.
pub const CAPACITY_DEFAULT: &str = "Estándar";

/// Sentinel color for items whose feed entry carries no explicit color.
pub const COLOR_SENTINEL: &str = "sin color";

/// Item condition as declared by the feed. Defaults to `New` when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Used,
    Refurbished,
}

impl Condition {
    /// Parses a raw feed condition string; anything unrecognized maps to `New`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "used" => Condition::Used,
            "refurbished" => Condition::Refurbished,
            _ => Condition::New,
        }
    }

    /// Display value used for the condition option axis.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Condition::New => "Nuevo",
            Condition::Used => "Usado",
            Condition::Refurbished => "Reacondicionado",
        }
    }

    /// Lowercase tag contributed to the product draft's tag set.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Condition::New => "nuevo",
            Condition::Used => "usado",
            Condition::Refurbished => "reacondicionado",
        }
    }
}

/// Stock state derived from the feed's availability field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    Preorder,
    OutOfStock,
}

impl Availability {
    /// Maps a raw feed availability string.
    ///
    /// `in_stock`/`available` → `InStock`; `preorder`/`coming_soon`/`new` →
    /// `Preorder`; anything else (including empty) → `OutOfStock`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "in_stock" | "available" => Availability::InStock,
            "preorder" | "coming_soon" | "new" => Availability::Preorder,
            _ => Availability::OutOfStock,
        }
    }
}

/// One feed item after attribute extraction, immutable thereafter.
///
/// `model_key` is the canonical grouping identity: two items with an equal
/// key are variants of the same logical product. The derivation is
/// deterministic, so re-running the sync on the same feed reproduces the
/// same keys and previously created remote products are found again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedVariant {
    pub sku: String,
    /// Cleaned display title shared by the whole group, e.g. `"Samsung Galaxy S23 Ultra"`.
    pub model_title: String,
    /// `normalize(model_title)` — the grouping key.
    pub model_key: String,
    /// Feed-provided group id, used as a grouping fallback when no key could
    /// be derived from the title.
    pub group_hint: Option<String>,
    /// Capacity token, e.g. `"256GB"`; [`CAPACITY_DEFAULT`] when undetected.
    pub capacity: String,
    /// Lowercased explicit feed color; [`COLOR_SENTINEL`] when absent.
    pub color: String,
    pub condition: Condition,
    /// `None` means the feed price was missing, unparseable, or non-positive —
    /// a terminal per-item error, never zero.
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    /// Digits-only barcode, present only when the feed GTIN has 8+ digits.
    pub gtin: Option<String>,
    pub brand: String,
    pub description: String,
    /// Feed product category, forwarded as the remote product type.
    pub category: String,
    pub availability: Availability,
}

impl NormalizedVariant {
    /// Returns `true` when the color is a real value rather than the sentinel.
    #[must_use]
    pub fn has_real_color(&self) -> bool {
        self.color != COLOR_SENTINEL && !self.color.trim().is_empty()
    }
}

/// All feed items sharing one model key; becomes one remote product with N
/// variants. Non-empty; members keep feed order.
#[derive(Debug, Clone)]
pub struct VariantGroup {
    pub key: String,
    pub variants: Vec<NormalizedVariant>,
}

impl VariantGroup {
    /// Display title for the group, taken from the first member.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.variants[0].model_title
    }
}
