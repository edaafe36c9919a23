use thiserror::Error;

/// Errors returned by catalog operations.
///
/// `Throttled` is the only error the retry wrapper treats specially (larger
/// backoff base); `Validation` is permanent and must surface as a group
/// error rather than being retried.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("catalog HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx, non-429 HTTP status from the catalog endpoint.
    #[error("unexpected HTTP status {status} from catalog")]
    UnexpectedStatus { status: u16 },

    /// The catalog asked us to back off (HTTP 429 or a THROTTLED GraphQL code).
    #[error("catalog throttled (retry after {retry_after_secs:?}s)")]
    Throttled { retry_after_secs: Option<u64> },

    /// A mutation was rejected with user errors; retrying cannot fix it.
    #[error("catalog rejected {context}: {message}")]
    Validation { context: String, message: String },

    /// Top-level GraphQL error that is not throttling.
    #[error("catalog GraphQL error for {context}: {message}")]
    Graphql { context: String, message: String },

    /// The response body could not be parsed into the expected shape.
    #[error("catalog deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Newly created media never became visible within the poll window.
    #[error("media for product {product_id} not visible after {attempts} polls")]
    MediaTimeout { product_id: String, attempts: u32 },
}
