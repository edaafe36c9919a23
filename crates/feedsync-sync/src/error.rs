use thiserror::Error;

use feedsync_catalog::CatalogError;
use feedsync_feed::FeedError;

/// Fatal run-level errors.
///
/// Once group iteration has started nothing propagates out of the run —
/// per-group failures are recorded and reported via `group-error` events —
/// so the only way a run can fail is before the first group.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The feed could not be downloaded or parsed at run start.
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),
}

/// Failure of a single group's pipeline. Recorded and reported; never
/// aborts the run.
#[derive(Debug, Error)]
pub enum GroupError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Every item in the group was missing a usable price.
    #[error("group {group} has no sellable variants")]
    NoSellableVariants { group: String },
}
