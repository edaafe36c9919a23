use thiserror::Error;

/// Errors raised while downloading or parsing a product feed.
///
/// Fetch-level failures abort a sync run before any group is processed;
/// a well-formed document with no item container is NOT an error and
/// parses to an empty item list.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("feed HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed URL answered with a non-2xx status.
    #[error("feed returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The document is not well-formed XML.
    #[error("feed XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}
