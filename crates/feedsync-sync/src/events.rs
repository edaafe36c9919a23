//! Progress events emitted while a run executes.
//!
//! The orchestrator calls [`ProgressSink::emit`] synchronously in event
//! order; the sink decides how events reach a UI (log lines, a channel
//! bridged to a push transport, ...). Exactly one `sync-start` and at most
//! one terminal event (`sync-end` or `sync-cancelled`) are emitted per run.

use serde::Serialize;
use uuid::Uuid;

use crate::run::SyncSummary;

/// What happened to a group as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupAction {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SyncEvent {
    SyncStart {
        run_id: Uuid,
        feed_url: String,
    },
    GroupsDetected {
        total_groups: usize,
        total_items: usize,
    },
    GroupStart {
        group_key: String,
        title: String,
        variant_count: usize,
        processed: usize,
        total: usize,
    },
    GroupEnd {
        group_key: String,
        action: GroupAction,
        created: usize,
        updated: usize,
        skipped: usize,
        errored: usize,
        processed: usize,
        total: usize,
    },
    GroupError {
        group_key: String,
        message: String,
        processed: usize,
        total: usize,
    },
    VariantDetectedCreate {
        group_key: String,
        sku: String,
        options: String,
    },
    VariantDetectedUpdate {
        group_key: String,
        sku: String,
        options: String,
    },
    VariantProcessingStart {
        group_key: String,
        sku: String,
    },
    VariantProcessingSuccess {
        group_key: String,
        sku: String,
    },
    VariantProcessingError {
        group_key: String,
        sku: String,
        message: String,
    },
    VariantSkipped {
        group_key: String,
        sku: String,
    },
    SyncCancelled {
        summary: SyncSummary,
    },
    SyncEnd {
        summary: SyncSummary,
    },
}

/// Fan-out hook for progress events.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: &SyncEvent);
}

/// Sink that renders every event as a structured log line.
#[derive(Debug, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn emit(&self, event: &SyncEvent) {
        match event {
            SyncEvent::SyncStart { run_id, feed_url } => {
                tracing::info!(%run_id, %feed_url, "sync started");
            }
            SyncEvent::GroupsDetected {
                total_groups,
                total_items,
            } => {
                tracing::info!(total_groups, total_items, "groups detected");
            }
            SyncEvent::GroupStart {
                group_key,
                variant_count,
                ..
            } => {
                tracing::info!(%group_key, variant_count, "group start");
            }
            SyncEvent::GroupEnd {
                group_key,
                action,
                created,
                updated,
                skipped,
                errored,
                ..
            } => {
                tracing::info!(
                    %group_key,
                    ?action,
                    created,
                    updated,
                    skipped,
                    errored,
                    "group end"
                );
            }
            SyncEvent::GroupError {
                group_key, message, ..
            } => {
                tracing::warn!(%group_key, %message, "group error");
            }
            SyncEvent::VariantProcessingError {
                group_key,
                sku,
                message,
            } => {
                tracing::warn!(%group_key, %sku, %message, "variant error");
            }
            SyncEvent::SyncCancelled { summary } => {
                tracing::info!(?summary, "sync cancelled");
            }
            SyncEvent::SyncEnd { summary } => {
                tracing::info!(?summary, "sync finished");
            }
            other => {
                tracing::debug!(event = ?other, "sync event");
            }
        }
    }
}

/// Sink that forwards events into a tokio channel, for tests and for
/// bridging to an external push transport.
#[derive(Debug)]
pub struct ChannelSink {
    tx: tokio::sync::mpsc::UnboundedSender<SyncEvent>,
}

impl ChannelSink {
    /// Returns the sink plus the receiving end of the channel.
    #[must_use]
    pub fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<SyncEvent>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: &SyncEvent) {
        // A closed receiver just means nobody is watching anymore.
        let _ = self.tx.send(event.clone());
    }
}
