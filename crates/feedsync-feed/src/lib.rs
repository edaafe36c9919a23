//! Feed ingestion: HTTP download and Google Shopping RSS parsing.
//!
//! The output of this crate is a flat list of [`FeedItem`]s; attribute
//! extraction and grouping happen downstream in `feedsync-extract`.

mod error;
mod fetch;
mod parse;
mod price;
mod types;

pub use error::FeedError;
pub use fetch::fetch_feed;
pub use parse::parse_feed;
pub use price::parse_price;
pub use types::FeedItem;
