use rust_decimal::Decimal;

/// One `<item>` from the feed, parsed but not yet normalized.
///
/// Field names track the Google Shopping `g:` namespace fields they come
/// from; empty strings mean the element was absent.
#[derive(Debug, Clone, Default)]
pub struct FeedItem {
    /// `g:id` — the supplier SKU.
    pub sku: String,
    /// `g:item_group_id` — supplier-side grouping hint.
    pub group_id_hint: Option<String>,
    /// `g:title`, verbatim.
    pub raw_title: String,
    /// `g:brand`.
    pub brand: String,
    /// `g:description`.
    pub description: String,
    /// Parsed `g:price`; `None` when missing, unparseable, or non-positive.
    pub price: Option<Decimal>,
    /// `g:gtin`, verbatim (digit validation happens at extraction).
    pub gtin: Option<String>,
    /// `g:image_link`.
    pub image_url: Option<String>,
    /// `g:color`, verbatim.
    pub raw_color: String,
    /// `g:availability`, verbatim.
    pub raw_availability: String,
    /// `g:condition`, verbatim.
    pub raw_condition: String,
    /// `g:product_type`.
    pub category: String,
}
