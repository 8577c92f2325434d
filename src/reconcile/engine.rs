//! Batched reconciliation against the destination table
//!
//! Postings are submitted in fixed-size batches. Each batch is deduplicated
//! by identity key, diffed against the destination (which keys already
//! exist), then merge-upserted. The existence-check + upsert pair retries as
//! a unit; a terminally failed batch is skipped so one outage cannot discard
//! unrelated, already-collected data.

use std::collections::HashSet;

use crate::pipeline::NormalizedPosting;
use crate::reconcile::store::DestinationStore;
use crate::retry::RetryPolicy;
use crate::{HarvestError, Result};

/// Batch size for destination submissions
pub const BATCH_SIZE: usize = 50;

/// Insert/update counts for one run (or one batch)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertStats {
    pub inserted: u64,
    pub updated: u64,
}

impl UpsertStats {
    pub fn total(&self) -> u64 {
        self.inserted + self.updated
    }
}

/// Existence-diffing upsert engine with per-batch retry
pub struct ReconciliationEngine {
    store: DestinationStore,
    retry: RetryPolicy,
}

impl ReconciliationEngine {
    pub fn new(store: DestinationStore) -> Self {
        Self::with_retry(store, RetryPolicy::for_reconciliation())
    }

    pub fn with_retry(store: DestinationStore, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Upserts all postings in batches; returns summed counts over the
    /// batches that succeeded
    pub async fn upsert(&self, postings: &[NormalizedPosting]) -> UpsertStats {
        let mut totals = UpsertStats::default();
        if postings.is_empty() {
            return totals;
        }

        let total_batches = (postings.len() + BATCH_SIZE - 1) / BATCH_SIZE;
        for (index, batch) in postings.chunks(BATCH_SIZE).enumerate() {
            let batch_num = index + 1;
            match self.upsert_batch(batch).await {
                Ok(stats) => {
                    totals.inserted += stats.inserted;
                    totals.updated += stats.updated;
                    tracing::info!(
                        "  Batch {}/{} → inserted={}, updated={}",
                        batch_num,
                        total_batches,
                        stats.inserted,
                        stats.updated
                    );
                }
                Err(e) => {
                    tracing::error!(
                        "  Failed to upsert batch {}/{}: {} — skipping batch",
                        batch_num,
                        total_batches,
                        e
                    );
                }
            }
        }

        totals
    }

    async fn upsert_batch(&self, batch: &[NormalizedPosting]) -> Result<UpsertStats> {
        // Dedup by identity key (first occurrence wins) so the pre-check diff
        // counts distinct destination rows
        let mut seen = HashSet::new();
        let rows: Vec<&NormalizedPosting> = batch
            .iter()
            .filter(|posting| seen.insert(posting.source_url.as_str()))
            .collect();

        self.retry
            .run(|| self.attempt_batch(&rows), is_transient)
            .await
    }

    /// One existence-check + upsert attempt; retried as a unit
    async fn attempt_batch(&self, rows: &[&NormalizedPosting]) -> Result<UpsertStats> {
        let keys: Vec<String> = rows.iter().map(|p| p.source_url.clone()).collect();
        let existing = self.store.fetch_existing_keys(&keys).await?;

        let updated = keys.iter().filter(|k| existing.contains(*k)).count() as u64;
        let inserted = keys.len() as u64 - updated;

        self.store.upsert_rows(rows).await?;

        Ok(UpsertStats { inserted, updated })
    }
}

/// Transient remote errors worth retrying: timeouts, connection failures,
/// 5xx and rate limiting
fn is_transient(err: &HarvestError) -> bool {
    match err {
        HarvestError::Reqwest(e) => e.is_timeout() || e.is_connect(),
        HarvestError::Destination { status, .. } => *status >= 500 || *status == 429,
        _ => false,
    }
}
