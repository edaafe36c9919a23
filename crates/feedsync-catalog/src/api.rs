use crate::error::CatalogError;
use crate::types::{
    BulkVariantResult, Channel, MediaRef, ProductMeta, RemoteProduct, RemoteVariant,
    VariantPayload,
};

/// The remote catalog as a transactional RPC boundary.
///
/// The orchestrator is generic over this trait; tests run against an
/// in-memory implementation, production uses
/// [`crate::ShopifyAdminClient`]. Implementations are expected to retry
/// transient failures internally (see [`crate::with_retry`]) so callers
/// only ever observe exhausted-retry or permanent errors.
#[allow(async_fn_in_trait)]
pub trait CatalogApi {
    /// Searches products with a catalog query string (e.g. `handle:foo`).
    async fn search_products(&self, query: &str) -> Result<Vec<RemoteProduct>, CatalogError>;

    /// Creates a product shell (no variants yet) and returns the remote
    /// record including its default variant.
    async fn create_product(&self, meta: &ProductMeta) -> Result<RemoteProduct, CatalogError>;

    /// Attaches images by URL. Returned refs may not yet carry a resolved
    /// URL; poll [`CatalogApi::get_media`] for visibility.
    async fn create_media(
        &self,
        product_id: &str,
        urls: &[String],
    ) -> Result<Vec<MediaRef>, CatalogError>;

    /// Lists a product's media. Newly created media may take a few seconds
    /// to appear here.
    async fn get_media(&self, product_id: &str) -> Result<Vec<MediaRef>, CatalogError>;

    async fn bulk_create_variants(
        &self,
        product_id: &str,
        variants: &[VariantPayload],
    ) -> Result<BulkVariantResult, CatalogError>;

    async fn bulk_update_variants(
        &self,
        product_id: &str,
        variants: &[VariantPayload],
    ) -> Result<BulkVariantResult, CatalogError>;

    async fn get_variants(&self, product_id: &str) -> Result<Vec<RemoteVariant>, CatalogError>;

    async fn list_publication_channels(&self) -> Result<Vec<Channel>, CatalogError>;

    /// Publishes the product to the given channels. Idempotent: publishing
    /// an already-published product must not error.
    async fn publish(&self, product_id: &str, channel_ids: &[String]) -> Result<(), CatalogError>;
}
