//! Drives a full reconciliation run.
//!
//! Groups are processed in bounded batches with a mandatory delay between
//! batches (deliberate backpressure against the catalog's rate limits, not
//! an optimization). Cancellation is cooperative and polled at batch
//! boundaries only: in-flight groups always finish. A group failure is
//! recorded and reported; it never aborts the run.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use uuid::Uuid;

use feedsync_catalog::{BulkVariantResult, CatalogApi, MediaRef, RemoteProduct, VariantPayload};
use feedsync_core::{AppConfig, VariantGroup};
use feedsync_extract::{derive_variant, group_variants};
use feedsync_feed::{fetch_feed, parse_feed};

use crate::diff::diff_variants;
use crate::draft::{build_draft, DraftVariant, ProductDraft};
use crate::error::{GroupError, SyncError};
use crate::events::{GroupAction, ProgressSink, SyncEvent};
use crate::matcher::find_existing;
use crate::media::poll_media;
use crate::run::{RunContext, RunStatus, SyncCounters, SyncSummary};

/// Per-group accounting handed back to the batch loop.
struct GroupOutcome {
    action: GroupAction,
    created: usize,
    updated: usize,
    skipped: usize,
    errored: usize,
}

/// Orchestrates one sync run against a catalog client.
pub struct SyncOrchestrator<'a, C> {
    client: &'a C,
    config: &'a AppConfig,
    sink: &'a dyn ProgressSink,
    ctx: &'a RunContext,
}

impl<'a, C: CatalogApi> SyncOrchestrator<'a, C> {
    pub fn new(
        client: &'a C,
        config: &'a AppConfig,
        sink: &'a dyn ProgressSink,
        ctx: &'a RunContext,
    ) -> Self {
        Self {
            client,
            config,
            sink,
            ctx,
        }
    }

    /// Runs the full pipeline: fetch → parse → extract → group → reconcile.
    ///
    /// Always terminates with a summary once group iteration has started;
    /// only fetch/parse failures at run start are fatal.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Feed`] when the feed cannot be downloaded or is
    /// not well-formed XML.
    pub async fn run(&self, feed_url: &str) -> Result<SyncSummary, SyncError> {
        self.ctx.cancel.reset();
        let started_at = Utc::now();
        let run_id = Uuid::new_v4();

        let xml = fetch_feed(
            feed_url,
            self.config.feed_timeout_secs,
            self.config.feed_fetch_retries,
        )
        .await?;
        let items = parse_feed(&xml)?;

        self.sink.emit(&SyncEvent::SyncStart {
            run_id,
            feed_url: feed_url.to_string(),
        });

        let counters = SyncCounters::new();

        let mut variants = Vec::with_capacity(items.len());
        for item in &items {
            let variant = derive_variant(item);
            if variant.price.is_none() {
                // Terminal per-item error: the item is excluded, the run
                // continues.
                tracing::warn!(
                    sku = %variant.sku,
                    title = %variant.model_title,
                    "item has no usable price — excluded from sync"
                );
                counters.add_errored(1);
                self.sink.emit(&SyncEvent::VariantProcessingError {
                    group_key: variant.model_key.clone(),
                    sku: variant.sku.clone(),
                    message: "missing or invalid price".to_string(),
                });
                continue;
            }
            variants.push(variant);
        }

        let groups = group_variants(variants);
        let total = groups.len();
        self.sink.emit(&SyncEvent::GroupsDetected {
            total_groups: total,
            total_items: items.len(),
        });

        let batch_size = self.config.batch_size.max(1);
        let mut scheduled = 0usize;
        for batch in groups.chunks(batch_size) {
            if self.ctx.cancel.was_cancelled() {
                tracing::info!(
                    scheduled,
                    total,
                    "cancellation requested — skipping remaining groups"
                );
                let summary = counters.summary(RunStatus::Cancelled, total, started_at);
                self.sink.emit(&SyncEvent::SyncCancelled {
                    summary: summary.clone(),
                });
                return Ok(summary);
            }

            join_all(
                batch
                    .iter()
                    .map(|group| self.process_group(group, &counters, total)),
            )
            .await;

            scheduled += batch.len();
            if scheduled < total {
                tokio::time::sleep(Duration::from_millis(self.config.inter_batch_delay_ms)).await;
            }
        }

        let summary = counters.summary(RunStatus::Completed, total, started_at);
        self.sink.emit(&SyncEvent::SyncEnd {
            summary: summary.clone(),
        });
        Ok(summary)
    }

    /// Runs one group's pipeline and records its outcome. Catches every
    /// error at this boundary so a bad product cannot block the rest of
    /// the catalog.
    async fn process_group(&self, group: &VariantGroup, counters: &SyncCounters, total: usize) {
        self.sink.emit(&SyncEvent::GroupStart {
            group_key: group.key.clone(),
            title: group.title().to_string(),
            variant_count: group.variants.len(),
            processed: counters.processed(),
            total,
        });

        match self.sync_group(group).await {
            Ok(outcome) => {
                counters.group_processed();
                counters.add_created(outcome.created);
                counters.add_updated(outcome.updated);
                counters.add_skipped(outcome.skipped);
                counters.add_errored(outcome.errored);
                self.sink.emit(&SyncEvent::GroupEnd {
                    group_key: group.key.clone(),
                    action: outcome.action,
                    created: outcome.created,
                    updated: outcome.updated,
                    skipped: outcome.skipped,
                    errored: outcome.errored,
                    processed: counters.processed(),
                    total,
                });
            }
            Err(err) => {
                counters.group_processed();
                counters.group_errored();
                tracing::warn!(
                    group_key = %group.key,
                    error = %err,
                    "group failed — continuing with remaining groups"
                );
                self.sink.emit(&SyncEvent::GroupError {
                    group_key: group.key.clone(),
                    message: err.to_string(),
                    processed: counters.processed(),
                    total,
                });
            }
        }
    }

    async fn sync_group(&self, group: &VariantGroup) -> Result<GroupOutcome, GroupError> {
        let draft = build_draft(group, &self.config.vendor);
        if draft.variants.is_empty() {
            return Err(GroupError::NoSellableVariants {
                group: group.key.clone(),
            });
        }

        let first_sku = &group.variants[0].sku;
        match find_existing(self.client, &group.key, first_sku, group.title()).await {
            Some(existing) => self.update_existing(&existing, &draft).await,
            None => self.create_new(&draft).await,
        }
    }

    async fn create_new(&self, draft: &ProductDraft) -> Result<GroupOutcome, GroupError> {
        for variant in &draft.variants {
            self.sink.emit(&SyncEvent::VariantDetectedCreate {
                group_key: draft.group_key.clone(),
                sku: variant.sku.clone(),
                options: variant.options_summary(),
            });
        }

        let product = self.client.create_product(&draft.meta).await?;
        let media_ids = self
            .upload_media(&product.id, &draft.image_urls, &product.media)
            .await;

        let attempted: Vec<&DraftVariant> = draft.variants.iter().collect();
        let payloads = self.payloads_for(&attempted, &media_ids, |_| None);
        for variant in &attempted {
            self.sink.emit(&SyncEvent::VariantProcessingStart {
                group_key: draft.group_key.clone(),
                sku: variant.sku.clone(),
            });
        }
        let result = self
            .client
            .bulk_create_variants(&product.id, &payloads)
            .await?;
        let (created, errored) = self.report_bulk(&draft.group_key, &attempted, &result);

        self.publish(&product.id).await;

        Ok(GroupOutcome {
            action: GroupAction::Created,
            created,
            updated: 0,
            skipped: 0,
            errored,
        })
    }

    async fn update_existing(
        &self,
        existing: &RemoteProduct,
        draft: &ProductDraft,
    ) -> Result<GroupOutcome, GroupError> {
        let diff = diff_variants(existing, draft);

        for variant in &diff.to_create {
            self.sink.emit(&SyncEvent::VariantDetectedCreate {
                group_key: draft.group_key.clone(),
                sku: variant.sku.clone(),
                options: variant.options_summary(),
            });
        }
        for update in &diff.to_update {
            self.sink.emit(&SyncEvent::VariantDetectedUpdate {
                group_key: draft.group_key.clone(),
                sku: update.variant.sku.clone(),
                options: update.variant.options_summary(),
            });
        }
        for variant in &diff.to_skip {
            self.sink.emit(&SyncEvent::VariantSkipped {
                group_key: draft.group_key.clone(),
                sku: variant.sku.clone(),
            });
        }

        let media_ids = self
            .upload_media(&existing.id, &draft.image_urls, &existing.media)
            .await;

        let mut created = 0usize;
        let mut updated = 0usize;
        let mut errored = 0usize;

        if !diff.to_update.is_empty() {
            let attempted: Vec<&DraftVariant> =
                diff.to_update.iter().map(|u| &u.variant).collect();
            let remote_ids: HashMap<&str, &str> = diff
                .to_update
                .iter()
                .map(|u| (u.variant.sku.as_str(), u.remote_id.as_str()))
                .collect();
            let payloads = self.payloads_for(&attempted, &media_ids, |v| {
                remote_ids.get(v.sku.as_str()).map(|id| (*id).to_string())
            });
            for variant in &attempted {
                self.sink.emit(&SyncEvent::VariantProcessingStart {
                    group_key: draft.group_key.clone(),
                    sku: variant.sku.clone(),
                });
            }
            let result = self
                .client
                .bulk_update_variants(&existing.id, &payloads)
                .await?;
            let (ok, failed) = self.report_bulk(&draft.group_key, &attempted, &result);
            updated += ok;
            errored += failed;
        }

        if !diff.to_create.is_empty() {
            let attempted: Vec<&DraftVariant> = diff.to_create.iter().collect();
            let payloads = self.payloads_for(&attempted, &media_ids, |_| None);
            for variant in &attempted {
                self.sink.emit(&SyncEvent::VariantProcessingStart {
                    group_key: draft.group_key.clone(),
                    sku: variant.sku.clone(),
                });
            }
            let result = self
                .client
                .bulk_create_variants(&existing.id, &payloads)
                .await?;
            let (ok, failed) = self.report_bulk(&draft.group_key, &attempted, &result);
            created += ok;
            errored += failed;
        }

        self.publish(&existing.id).await;

        let action = if created + updated > 0 {
            GroupAction::Updated
        } else {
            GroupAction::Unchanged
        };
        Ok(GroupOutcome {
            action,
            created,
            updated,
            skipped: diff.to_skip.len(),
            errored,
        })
    }

    fn payloads_for(
        &self,
        variants: &[&DraftVariant],
        media_ids: &HashMap<String, String>,
        remote_id: impl Fn(&DraftVariant) -> Option<String>,
    ) -> Vec<VariantPayload> {
        variants
            .iter()
            .map(|v| {
                let media_id = v
                    .image_url
                    .as_ref()
                    .and_then(|url| media_ids.get(url).cloned());
                v.to_payload(remote_id(v), media_id)
            })
            .collect()
    }

    /// Uploads image URLs not already present on the product and waits for
    /// them to become visible. Returns the combined URL → media id map.
    ///
    /// Failures here are non-fatal: the product and its variants still
    /// sync, just without the affected images.
    async fn upload_media(
        &self,
        product_id: &str,
        urls: &[String],
        existing_media: &[MediaRef],
    ) -> HashMap<String, String> {
        let mut map: HashMap<String, String> = existing_media
            .iter()
            .filter_map(|m| m.url.clone().map(|url| (url, m.id.clone())))
            .collect();

        let new_urls: Vec<String> = urls
            .iter()
            .filter(|url| !map.contains_key(*url))
            .cloned()
            .collect();
        if new_urls.is_empty() {
            return map;
        }

        match self.client.create_media(product_id, &new_urls).await {
            Ok(created) => {
                // create_media preserves input order, so zip pairs each URL
                // with its new media id.
                for (url, media) in new_urls.iter().zip(&created) {
                    map.insert(url.clone(), media.id.clone());
                }
                let expected = existing_media.len() + created.len();
                if let Err(err) = poll_media(
                    self.client,
                    product_id,
                    expected,
                    self.config.media_poll_attempts,
                    self.config.media_poll_delay_ms,
                )
                .await
                {
                    tracing::warn!(
                        product_id,
                        error = %err,
                        "new media never became visible — syncing variants without them"
                    );
                    for url in &new_urls {
                        map.remove(url);
                    }
                }
            }
            Err(err) => {
                tracing::warn!(
                    product_id,
                    error = %err,
                    "media upload failed — syncing variants without images"
                );
            }
        }

        map
    }

    /// Emits per-variant success/error events for a bulk result and returns
    /// `(succeeded, failed)` counts.
    fn report_bulk(
        &self,
        group_key: &str,
        attempted: &[&DraftVariant],
        result: &BulkVariantResult,
    ) -> (usize, usize) {
        let applied_skus: HashSet<&str> =
            result.applied.iter().filter_map(|v| v.sku.as_deref()).collect();
        let error_message = if result.errors.is_empty() {
            "variant rejected by catalog".to_string()
        } else {
            result
                .errors
                .iter()
                .map(|e| e.message.clone())
                .collect::<Vec<_>>()
                .join("; ")
        };

        let mut succeeded = 0usize;
        let mut failed = 0usize;
        for variant in attempted {
            if applied_skus.contains(variant.sku.as_str()) {
                succeeded += 1;
                self.sink.emit(&SyncEvent::VariantProcessingSuccess {
                    group_key: group_key.to_string(),
                    sku: variant.sku.clone(),
                });
            } else {
                failed += 1;
                self.sink.emit(&SyncEvent::VariantProcessingError {
                    group_key: group_key.to_string(),
                    sku: variant.sku.clone(),
                    message: error_message.clone(),
                });
            }
        }
        (succeeded, failed)
    }

    /// Publishes the product to the configured channels. Idempotent on the
    /// catalog side; failures are reported but do not fail the group.
    async fn publish(&self, product_id: &str) {
        let channels = match self.client.list_publication_channels().await {
            Ok(channels) => channels,
            Err(err) => {
                tracing::warn!(product_id, error = %err, "could not list publication channels");
                return;
            }
        };

        let wanted: Vec<String> = channels
            .iter()
            .filter(|c| self.config.publication_channels.contains(&c.name))
            .map(|c| c.id.clone())
            .collect();
        if wanted.is_empty() {
            tracing::warn!(
                configured = ?self.config.publication_channels,
                "none of the configured publication channels exist on this shop"
            );
            return;
        }

        if let Err(err) = self.client.publish(product_id, &wanted).await {
            tracing::warn!(product_id, error = %err, "publish failed");
        }
    }
}
