//! Attribute extraction and variant grouping.
//!
//! Turns raw [`feedsync_feed::FeedItem`]s into
//! [`feedsync_core::NormalizedVariant`]s by deriving a canonical model title
//! and grouping key from the noisy supplier title, then buckets variants by
//! that key. The derivation is a fixed ordered pipeline of named rewrite
//! rules (see [`rules`]); identical input always produces an identical key,
//! which is what keeps re-runs idempotent against the remote catalog.

mod extract;
mod group;
mod lexicon;
mod normalize;
mod rules;

pub use extract::{derive_variant, extract_capacity, extract_model_key, extract_model_title};
pub use group::group_variants;
pub use normalize::normalize;
