//! Feed-to-catalog reconciliation engine.
//!
//! Drives the per-group pipeline (match → build → diff → apply media →
//! apply variants → publish) over the groups detected in a feed, with
//! bounded batch concurrency, cooperative cancellation, per-group failure
//! isolation, and an ordered progress-event stream.

mod diff;
mod draft;
mod error;
mod events;
mod matcher;
mod media;
mod orchestrator;
mod run;

pub use diff::{diff_variants, VariantDiff, VariantUpdate};
pub use draft::{
    build_draft, DraftVariant, ProductDraft, OPTION_CAPACITY, OPTION_COLOR, OPTION_CONDITION,
};
pub use error::{GroupError, SyncError};
pub use events::{ChannelSink, GroupAction, ProgressSink, SyncEvent, TracingSink};
pub use matcher::{find_existing, handle_for_key};
pub use media::poll_media;
pub use orchestrator::SyncOrchestrator;
pub use run::{CancelFlag, RunContext, RunStatus, SyncCounters, SyncSummary};
