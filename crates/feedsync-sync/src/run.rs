//! Run-scoped state: cancellation, counters, and the final summary.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Cooperative cancellation gate for one tenant's sync runs.
///
/// A plain boolean flag, polled at batch boundaries only — an in-flight
/// group always finishes. Cloning shares the underlying flag, so a clone
/// handed to a signal handler cancels the run that holds the original.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Per-run context passed into the orchestrator by value-reference rather
/// than living in process-global state.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub cancel: CancelFlag,
}

impl RunContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Terminal and in-flight states of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Idle,
    Running,
    Completed,
    Cancelled,
    Error,
}

/// Shared atomic counters mutated by concurrent group pipelines.
#[derive(Debug, Default)]
pub struct SyncCounters {
    groups_processed: AtomicUsize,
    groups_errored: AtomicUsize,
    variants_created: AtomicUsize,
    variants_updated: AtomicUsize,
    variants_skipped: AtomicUsize,
    variants_errored: AtomicUsize,
}

impl SyncCounters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_processed(&self) {
        self.groups_processed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn group_errored(&self) {
        self.groups_errored.fetch_add(1, Ordering::SeqCst);
    }

    pub fn add_created(&self, n: usize) {
        self.variants_created.fetch_add(n, Ordering::SeqCst);
    }

    pub fn add_updated(&self, n: usize) {
        self.variants_updated.fetch_add(n, Ordering::SeqCst);
    }

    pub fn add_skipped(&self, n: usize) {
        self.variants_skipped.fetch_add(n, Ordering::SeqCst);
    }

    pub fn add_errored(&self, n: usize) {
        self.variants_errored.fetch_add(n, Ordering::SeqCst);
    }

    #[must_use]
    pub fn processed(&self) -> usize {
        self.groups_processed.load(Ordering::SeqCst)
    }

    /// Freezes the counters into a summary with the given status and window.
    #[must_use]
    pub fn summary(
        &self,
        status: RunStatus,
        groups_total: usize,
        started_at: DateTime<Utc>,
    ) -> SyncSummary {
        SyncSummary {
            status,
            groups_total,
            groups_processed: self.groups_processed.load(Ordering::SeqCst),
            groups_errored: self.groups_errored.load(Ordering::SeqCst),
            variants_created: self.variants_created.load(Ordering::SeqCst),
            variants_updated: self.variants_updated.load(Ordering::SeqCst),
            variants_skipped: self.variants_skipped.load(Ordering::SeqCst),
            variants_errored: self.variants_errored.load(Ordering::SeqCst),
            started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Final (or cancellation-time) accounting for one run. The run always
/// terminates with a summary, even when some groups failed.
#[derive(Debug, Clone, Serialize)]
pub struct SyncSummary {
    pub status: RunStatus,
    pub groups_total: usize,
    pub groups_processed: usize,
    pub groups_errored: usize,
    pub variants_created: usize,
    pub variants_updated: usize,
    pub variants_skipped: usize,
    pub variants_errored: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_flag_roundtrip() {
        let flag = CancelFlag::new();
        assert!(!flag.was_cancelled());
        flag.request_cancel();
        assert!(flag.was_cancelled());
        flag.reset();
        assert!(!flag.was_cancelled());
    }

    #[test]
    fn cancel_flag_clones_share_state() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        clone.request_cancel();
        assert!(flag.was_cancelled());
    }

    #[test]
    fn counters_accumulate_into_summary() {
        let counters = SyncCounters::new();
        counters.group_processed();
        counters.group_processed();
        counters.group_errored();
        counters.add_created(3);
        counters.add_updated(1);
        counters.add_skipped(2);
        counters.add_errored(1);

        let summary = counters.summary(RunStatus::Completed, 2, Utc::now());
        assert_eq!(summary.groups_processed, 2);
        assert_eq!(summary.groups_errored, 1);
        assert_eq!(summary.variants_created, 3);
        assert_eq!(summary.variants_updated, 1);
        assert_eq!(summary.variants_skipped, 2);
        assert_eq!(summary.variants_errored, 1);
        assert_eq!(summary.status, RunStatus::Completed);
    }
}
