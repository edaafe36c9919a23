//! GraphQL Admin API implementation of [`CatalogApi`].

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::api::CatalogApi;
use crate::error::CatalogError;
use crate::retry::with_retry;
use crate::types::{
    BulkVariantResult, Channel, MediaRef, ProductMeta, RemoteProduct, RemoteVariant,
    SelectedOption, UserError, VariantPayload,
};

/// Client for the Shopify GraphQL Admin API.
///
/// One POST endpoint; the operation lives in the GraphQL document. Handles
/// HTTP 429 and GraphQL `THROTTLED` codes as [`CatalogError::Throttled`],
/// mutation `userErrors` as [`CatalogError::Validation`], and retries
/// transient failures internally.
pub struct ShopifyAdminClient {
    client: Client,
    endpoint: Url,
    access_token: String,
    max_retries: u32,
    retry_base_delay_ms: u64,
}

impl ShopifyAdminClient {
    /// Creates a client for a shop's Admin GraphQL endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CatalogError::Graphql`] if the shop
    /// domain does not form a valid URL.
    pub fn new(
        shop_domain: &str,
        access_token: &str,
        api_version: &str,
        timeout_secs: u64,
        max_retries: u32,
        retry_base_delay_ms: u64,
    ) -> Result<Self, CatalogError> {
        let endpoint = format!("https://{shop_domain}/admin/api/{api_version}/graphql.json");
        Self::with_endpoint(
            &endpoint,
            access_token,
            timeout_secs,
            max_retries,
            retry_base_delay_ms,
        )
    }

    /// Creates a client with an explicit endpoint URL (for testing against
    /// a wiremock server).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CatalogError::Graphql`] if `endpoint` is
    /// not a valid URL.
    pub fn with_endpoint(
        endpoint: &str,
        access_token: &str,
        timeout_secs: u64,
        max_retries: u32,
        retry_base_delay_ms: u64,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("feedsync/0.1 (catalog-sync)")
            .build()?;

        let endpoint = Url::parse(endpoint).map_err(|e| CatalogError::Graphql {
            context: "endpoint".to_string(),
            message: format!("invalid endpoint URL '{endpoint}': {e}"),
        })?;

        Ok(Self {
            client,
            endpoint,
            access_token: access_token.to_owned(),
            max_retries,
            retry_base_delay_ms,
        })
    }

    /// Posts one GraphQL document with retry and returns the `data` value.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Throttled`] — HTTP 429 or a `THROTTLED` error code,
    ///   after retries are exhausted.
    /// - [`CatalogError::UnexpectedStatus`] — other non-2xx statuses.
    /// - [`CatalogError::Graphql`] — top-level GraphQL errors.
    /// - [`CatalogError::Deserialize`] — body is not valid JSON.
    async fn graphql(
        &self,
        context: &'static str,
        query: &'static str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value, CatalogError> {
        with_retry(self.max_retries, self.retry_base_delay_ms, || {
            let variables = variables.clone();
            async move {
                let response = self
                    .client
                    .post(self.endpoint.clone())
                    .header("X-Shopify-Access-Token", &self.access_token)
                    .json(&json!({ "query": query, "variables": variables }))
                    .send()
                    .await?;

                let status = response.status();
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok());
                    return Err(CatalogError::Throttled { retry_after_secs });
                }
                if !status.is_success() {
                    return Err(CatalogError::UnexpectedStatus {
                        status: status.as_u16(),
                    });
                }

                let body = response.text().await?;
                let mut value: serde_json::Value =
                    serde_json::from_str(&body).map_err(|e| CatalogError::Deserialize {
                        context: context.to_string(),
                        source: e,
                    })?;

                if let Some(errors) = value.get("errors").and_then(serde_json::Value::as_array) {
                    if !errors.is_empty() {
                        let throttled = errors.iter().any(|e| {
                            e.pointer("/extensions/code").and_then(serde_json::Value::as_str)
                                == Some("THROTTLED")
                                || e.get("message")
                                    .and_then(serde_json::Value::as_str)
                                    .is_some_and(|m| m.to_lowercase().contains("throttle"))
                        });
                        if throttled {
                            return Err(CatalogError::Throttled {
                                retry_after_secs: None,
                            });
                        }
                        let message = errors
                            .iter()
                            .filter_map(|e| e.get("message").and_then(serde_json::Value::as_str))
                            .collect::<Vec<_>>()
                            .join("; ");
                        return Err(CatalogError::Graphql {
                            context: context.to_string(),
                            message,
                        });
                    }
                }

                Ok(value
                    .get_mut("data")
                    .map(serde_json::Value::take)
                    .unwrap_or(serde_json::Value::Null))
            }
        })
        .await
    }
}

impl CatalogApi for ShopifyAdminClient {
    async fn search_products(&self, query: &str) -> Result<Vec<RemoteProduct>, CatalogError> {
        let data = self
            .graphql("searchProducts", PRODUCT_SEARCH_DOC, json!({ "query": query }))
            .await?;
        let envelope: wire::SearchData = decode("searchProducts", data)?;
        Ok(envelope
            .products
            .edges
            .into_iter()
            .map(|e| e.node.into())
            .collect())
    }

    async fn create_product(&self, meta: &ProductMeta) -> Result<RemoteProduct, CatalogError> {
        let product = json!({
            "title": meta.title,
            "vendor": meta.vendor,
            "descriptionHtml": meta.description_html,
            "handle": meta.handle,
            "productType": meta.product_type,
            "status": "ACTIVE",
            "tags": meta.tags,
            "productOptions": meta.options.iter().map(|o| json!({
                "name": o.name,
                "values": o.values.iter().map(|v| json!({ "name": v })).collect::<Vec<_>>(),
            })).collect::<Vec<_>>(),
        });

        let data = self
            .graphql("productCreate", PRODUCT_CREATE_DOC, json!({ "product": product }))
            .await?;
        check_user_errors(&data, "/productCreate/userErrors", "productCreate")?;

        let envelope: wire::ProductCreateData = decode("productCreate", data)?;
        envelope
            .product_create
            .product
            .map(Into::into)
            .ok_or_else(|| CatalogError::Graphql {
                context: "productCreate".to_string(),
                message: "mutation returned no product".to_string(),
            })
    }

    async fn create_media(
        &self,
        product_id: &str,
        urls: &[String],
    ) -> Result<Vec<MediaRef>, CatalogError> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }
        let media: Vec<_> = urls
            .iter()
            .map(|url| {
                json!({
                    "originalSource": url,
                    "mediaContentType": "IMAGE",
                    "alt": media_alt(url),
                })
            })
            .collect();

        let data = self
            .graphql(
                "productCreateMedia",
                PRODUCT_CREATE_MEDIA_DOC,
                json!({ "productId": product_id, "media": media }),
            )
            .await?;

        // Per-image rejections are soft; the product still syncs without
        // the offending image.
        let rejected = collect_user_errors(&data, "/productCreateMedia/mediaUserErrors");
        if !rejected.is_empty() {
            tracing::warn!(
                product_id,
                errors = ?rejected,
                "some media were rejected by the catalog"
            );
        }

        let envelope: wire::ProductCreateMediaData = decode("productCreateMedia", data)?;
        Ok(envelope
            .product_create_media
            .media
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn get_media(&self, product_id: &str) -> Result<Vec<MediaRef>, CatalogError> {
        let data = self
            .graphql("productMedia", GET_MEDIA_DOC, json!({ "id": product_id }))
            .await?;
        let envelope: wire::ProductMediaData = decode("productMedia", data)?;
        Ok(envelope
            .product
            .map(|p| p.media.map(|m| m.nodes).unwrap_or_default())
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn bulk_create_variants(
        &self,
        product_id: &str,
        variants: &[VariantPayload],
    ) -> Result<BulkVariantResult, CatalogError> {
        self.bulk_variants(
            "productVariantsBulkCreate",
            VARIANTS_BULK_CREATE_DOC,
            product_id,
            variants,
        )
        .await
    }

    async fn bulk_update_variants(
        &self,
        product_id: &str,
        variants: &[VariantPayload],
    ) -> Result<BulkVariantResult, CatalogError> {
        self.bulk_variants(
            "productVariantsBulkUpdate",
            VARIANTS_BULK_UPDATE_DOC,
            product_id,
            variants,
        )
        .await
    }

    async fn get_variants(&self, product_id: &str) -> Result<Vec<RemoteVariant>, CatalogError> {
        let data = self
            .graphql("productVariants", GET_VARIANTS_DOC, json!({ "id": product_id }))
            .await?;
        let envelope: wire::ProductVariantsData = decode("productVariants", data)?;
        Ok(envelope
            .product
            .and_then(|p| p.variants)
            .map(|v| v.edges)
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.node.into())
            .collect())
    }

    async fn list_publication_channels(&self) -> Result<Vec<Channel>, CatalogError> {
        let data = self
            .graphql("publications", PUBLICATIONS_DOC, json!({}))
            .await?;
        let envelope: wire::PublicationsData = decode("publications", data)?;
        Ok(envelope
            .publications
            .edges
            .into_iter()
            .map(|e| Channel {
                id: e.node.id,
                name: e.node.name,
            })
            .collect())
    }

    async fn publish(&self, product_id: &str, channel_ids: &[String]) -> Result<(), CatalogError> {
        if channel_ids.is_empty() {
            return Ok(());
        }
        let input: Vec<_> = channel_ids
            .iter()
            .map(|id| json!({ "publicationId": id }))
            .collect();
        let data = self
            .graphql(
                "publishablePublish",
                PUBLISH_DOC,
                json!({ "id": product_id, "input": input }),
            )
            .await?;
        check_user_errors(&data, "/publishablePublish/userErrors", "publishablePublish")
    }
}

impl ShopifyAdminClient {
    async fn bulk_variants(
        &self,
        context: &'static str,
        doc: &'static str,
        product_id: &str,
        variants: &[VariantPayload],
    ) -> Result<BulkVariantResult, CatalogError> {
        if variants.is_empty() {
            return Ok(BulkVariantResult::default());
        }
        let payload: Vec<_> = variants.iter().map(variant_input).collect();
        let data = self
            .graphql(
                context,
                doc,
                json!({ "productId": product_id, "variants": payload }),
            )
            .await?;

        let pointer = format!("/{context}/productVariants");
        let applied: Vec<wire::VariantNode> = data
            .pointer(&pointer)
            .cloned()
            .map(|v| decode(context, v))
            .transpose()?
            .unwrap_or_default();

        Ok(BulkVariantResult {
            applied: applied.into_iter().map(Into::into).collect(),
            errors: collect_user_errors(&data, &format!("/{context}/userErrors")),
        })
    }
}

/// Serializes one [`VariantPayload`] into `ProductVariantsBulkInput`.
///
/// SKU rides on `inventoryItem.sku` (the bulk input has no top-level sku
/// field); the price is stringified because the API models money as a
/// decimal string.
fn variant_input(variant: &VariantPayload) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    obj.insert("price".to_string(), json!(variant.price.to_string()));
    obj.insert("inventoryPolicy".to_string(), json!("CONTINUE"));
    obj.insert(
        "optionValues".to_string(),
        json!(variant
            .option_values
            .iter()
            .map(|ov| json!({ "optionName": ov.option_name, "name": ov.value }))
            .collect::<Vec<_>>()),
    );
    if let Some(id) = &variant.remote_id {
        obj.insert("id".to_string(), json!(id));
    }
    if let Some(sku) = &variant.sku {
        obj.insert("inventoryItem".to_string(), json!({ "sku": sku }));
    }
    if let Some(barcode) = &variant.barcode {
        obj.insert("barcode".to_string(), json!(barcode));
    }
    if let Some(media_id) = &variant.media_id {
        obj.insert("mediaId".to_string(), json!(media_id));
    }
    serde_json::Value::Object(obj)
}

fn media_alt(url: &str) -> String {
    let name = url.rsplit('/').next().unwrap_or(url);
    let alt = format!("Imagen del producto - {name}");
    alt.chars().take(120).collect()
}

fn decode<T: DeserializeOwned>(context: &str, value: serde_json::Value) -> Result<T, CatalogError> {
    serde_json::from_value(value).map_err(|e| CatalogError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}

fn collect_user_errors(data: &serde_json::Value, pointer: &str) -> Vec<UserError> {
    data.pointer(pointer)
        .and_then(serde_json::Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .map(|e| UserError {
                    field: e.get("field").map(field_to_string),
                    message: e
                        .get("message")
                        .and_then(serde_json::Value::as_str)
                        .unwrap_or("unknown error")
                        .to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn field_to_string(field: &serde_json::Value) -> String {
    match field {
        serde_json::Value::Array(parts) => parts
            .iter()
            .filter_map(serde_json::Value::as_str)
            .collect::<Vec<_>>()
            .join("."),
        other => other.as_str().unwrap_or_default().to_string(),
    }
}

fn check_user_errors(
    data: &serde_json::Value,
    pointer: &str,
    context: &str,
) -> Result<(), CatalogError> {
    let errors = collect_user_errors(data, pointer);
    if errors.is_empty() {
        return Ok(());
    }
    Err(CatalogError::Validation {
        context: context.to_string(),
        message: errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; "),
    })
}

// ---------------------------------------------------------------------------
// GraphQL documents
// ---------------------------------------------------------------------------

const PRODUCT_SEARCH_DOC: &str = r"
query searchProducts($query: String!) {
  products(first: 5, query: $query) {
    edges {
      node {
        id
        title
        handle
        tags
        variants(first: 100) {
          edges {
            node {
              id
              sku
              barcode
              price
              selectedOptions { name value }
              media(first: 1) { nodes { id } }
            }
          }
        }
        media(first: 100) {
          nodes { id preview { image { url } } }
        }
      }
    }
  }
}";

const PRODUCT_CREATE_DOC: &str = r"
mutation createProduct($product: ProductCreateInput!) {
  productCreate(product: $product) {
    product {
      id
      title
      handle
      tags
      variants(first: 10) {
        edges {
          node { id sku barcode price selectedOptions { name value } }
        }
      }
      media(first: 10) { nodes { id preview { image { url } } } }
    }
    userErrors { field message }
  }
}";

const PRODUCT_CREATE_MEDIA_DOC: &str = r"
mutation productCreateMedia($productId: ID!, $media: [CreateMediaInput!]!) {
  productCreateMedia(productId: $productId, media: $media) {
    media { id preview { image { url } } }
    mediaUserErrors { field message }
  }
}";

const GET_MEDIA_DOC: &str = r"
query productMedia($id: ID!) {
  product(id: $id) {
    media(first: 100) { nodes { id preview { image { url } } } }
  }
}";

const VARIANTS_BULK_CREATE_DOC: &str = r"
mutation productVariantsBulkCreate($productId: ID!, $variants: [ProductVariantsBulkInput!]!) {
  productVariantsBulkCreate(productId: $productId, variants: $variants) {
    productVariants {
      id
      sku
      barcode
      price
      selectedOptions { name value }
      media(first: 1) { nodes { id } }
    }
    userErrors { field message }
  }
}";

const VARIANTS_BULK_UPDATE_DOC: &str = r"
mutation productVariantsBulkUpdate($productId: ID!, $variants: [ProductVariantsBulkInput!]!) {
  productVariantsBulkUpdate(productId: $productId, variants: $variants) {
    productVariants {
      id
      sku
      barcode
      price
      selectedOptions { name value }
      media(first: 1) { nodes { id } }
    }
    userErrors { field message }
  }
}";

const GET_VARIANTS_DOC: &str = r"
query productVariants($id: ID!) {
  product(id: $id) {
    variants(first: 100) {
      edges {
        node {
          id
          sku
          barcode
          price
          selectedOptions { name value }
          media(first: 1) { nodes { id } }
        }
      }
    }
  }
}";

const PUBLICATIONS_DOC: &str = r"
query publications {
  publications(first: 10) {
    edges { node { id name } }
  }
}";

const PUBLISH_DOC: &str = r"
mutation publishablePublish($id: ID!, $input: [PublicationInput!]!) {
  publishablePublish(id: $id, input: $input) {
    userErrors { field message }
  }
}";

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

mod wire {
    use super::{Decimal, Deserialize, MediaRef, RemoteProduct, RemoteVariant, SelectedOption};

    #[derive(Debug, Deserialize)]
    pub(super) struct Edges<T> {
        #[serde(default = "Vec::new")]
        pub(super) edges: Vec<Edge<T>>,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct Edge<T> {
        pub(super) node: T,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct Nodes<T> {
        #[serde(default = "Vec::new")]
        pub(super) nodes: Vec<T>,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct SelectedOptionNode {
        pub(super) name: String,
        pub(super) value: String,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct IdNode {
        pub(super) id: String,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct MediaImage {
        #[serde(default)]
        pub(super) url: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct MediaPreview {
        #[serde(default)]
        pub(super) image: Option<MediaImage>,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct MediaNode {
        pub(super) id: String,
        #[serde(default)]
        pub(super) preview: Option<MediaPreview>,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct VariantNode {
        pub(super) id: String,
        #[serde(default)]
        pub(super) sku: Option<String>,
        #[serde(default)]
        pub(super) barcode: Option<String>,
        #[serde(default, with = "rust_decimal::serde::str_option")]
        pub(super) price: Option<Decimal>,
        #[serde(rename = "selectedOptions", default)]
        pub(super) selected_options: Vec<SelectedOptionNode>,
        #[serde(default)]
        pub(super) media: Option<Nodes<IdNode>>,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct ProductNode {
        pub(super) id: String,
        pub(super) title: String,
        #[serde(default)]
        pub(super) handle: String,
        #[serde(default)]
        pub(super) tags: Vec<String>,
        #[serde(default)]
        pub(super) variants: Option<Edges<VariantNode>>,
        #[serde(default)]
        pub(super) media: Option<Nodes<MediaNode>>,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct SearchData {
        pub(super) products: Edges<ProductNode>,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct ProductCreateData {
        #[serde(rename = "productCreate")]
        pub(super) product_create: ProductCreatePayload,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct ProductCreatePayload {
        #[serde(default)]
        pub(super) product: Option<ProductNode>,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct ProductCreateMediaData {
        #[serde(rename = "productCreateMedia")]
        pub(super) product_create_media: ProductCreateMediaPayload,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct ProductCreateMediaPayload {
        #[serde(default = "Vec::new")]
        pub(super) media: Vec<MediaNode>,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct ProductMediaData {
        #[serde(default)]
        pub(super) product: Option<ProductMediaNode>,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct ProductMediaNode {
        #[serde(default)]
        pub(super) media: Option<Nodes<MediaNode>>,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct ProductVariantsData {
        #[serde(default)]
        pub(super) product: Option<ProductVariantsNode>,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct ProductVariantsNode {
        #[serde(default)]
        pub(super) variants: Option<Edges<VariantNode>>,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct PublicationsData {
        pub(super) publications: Edges<PublicationNode>,
    }

    #[derive(Debug, Deserialize)]
    pub(super) struct PublicationNode {
        pub(super) id: String,
        pub(super) name: String,
    }

    impl From<MediaNode> for MediaRef {
        fn from(node: MediaNode) -> Self {
            MediaRef {
                id: node.id,
                url: node.preview.and_then(|p| p.image).and_then(|i| i.url),
            }
        }
    }

    impl From<VariantNode> for RemoteVariant {
        fn from(node: VariantNode) -> Self {
            RemoteVariant {
                id: node.id,
                sku: node.sku.filter(|s| !s.is_empty()),
                barcode: node.barcode.filter(|b| !b.is_empty()),
                price: node.price,
                selected_options: node
                    .selected_options
                    .into_iter()
                    .map(|o| SelectedOption {
                        name: o.name,
                        value: o.value,
                    })
                    .collect(),
                media_id: node.media.and_then(|m| m.nodes.into_iter().next()).map(|n| n.id),
            }
        }
    }

    impl From<ProductNode> for RemoteProduct {
        fn from(node: ProductNode) -> Self {
            RemoteProduct {
                id: node.id,
                title: node.title,
                handle: node.handle,
                tags: node.tags,
                variants: node
                    .variants
                    .map(|v| v.edges)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|e| e.node.into())
                    .collect(),
                media: node
                    .media
                    .map(|m| m.nodes)
                    .unwrap_or_default()
                    .into_iter()
                    .map(Into::into)
                    .collect(),
            }
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
