//! Request and response records for catalog operations.
//!
//! These are the only shapes the rest of the workspace sees; the GraphQL
//! wire format stays inside [`crate::client`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product as it exists in the remote catalog — the source of truth for
/// what is already there. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteProduct {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub tags: Vec<String>,
    pub variants: Vec<RemoteVariant>,
    pub media: Vec<MediaRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteVariant {
    pub id: String,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub price: Option<Decimal>,
    pub selected_options: Vec<SelectedOption>,
    /// Id of the media currently assigned to this variant, if any.
    pub media_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

/// A media attachment on a remote product. `url` may lag behind creation
/// while the remote processes the upload, which is why media reads are
/// pollable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub id: String,
    pub url: Option<String>,
}

/// A sales channel products can be published to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
}

/// Product-level fields for `createProduct`.
///
/// `handle` is set explicitly to the slug derived from the model key so the
/// matcher finds the product again on later runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMeta {
    pub title: String,
    pub vendor: String,
    pub description_html: String,
    pub handle: String,
    pub product_type: String,
    pub tags: Vec<String>,
    pub options: Vec<ProductOptionInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOptionInput {
    pub name: String,
    pub values: Vec<String>,
}

/// One variant in a bulk create/update call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantPayload {
    /// Remote variant id; required for updates, absent for creates.
    pub remote_id: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub price: Decimal,
    pub option_values: Vec<OptionValuePair>,
    pub media_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValuePair {
    pub option_name: String,
    pub value: String,
}

/// A rejected field on a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    pub field: Option<String>,
    pub message: String,
}

/// Outcome of a bulk variant mutation: the variants the catalog accepted
/// plus any per-variant rejections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkVariantResult {
    pub applied: Vec<RemoteVariant>,
    pub errors: Vec<UserError>,
}
