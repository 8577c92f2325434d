//! Pipeline orchestration
//!
//! One complete crawl → normalize/translate → reconcile cycle. The three
//! terminal cases (crawl failure, nothing left after normalization,
//! reconciliation setup failure) abort the run with a zero-effect result;
//! everything below that level is isolated per page, per posting, per batch.

use std::time::Instant;

use crate::config::Config;
use crate::crawler::{build_criteria, crawl, JobBudget};
use crate::pipeline::normalize::normalize_posting;
use crate::reconcile::{DestinationStore, ReconciliationEngine};
use crate::translate::TranslationGuard;

/// Aggregate result of one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub inserted: u64,
    pub updated: u64,
}

/// Executes one full scrape cycle, returning insert/update counts
pub async fn run_pipeline(config: &Config) -> RunSummary {
    let start = Instant::now();
    let banner = "=".repeat(60);
    tracing::info!("{}", banner);
    tracing::info!("Pipeline start");
    tracing::info!("{}", banner);

    // 1. Crawl
    tracing::info!("STEP 1/3 — Crawling search surface …");
    let criteria = build_criteria(&config.search);
    let mut budget = JobBudget::new(config.search.max_postings_per_run);
    let raw_postings = match crawl(config, &criteria, &mut budget).await {
        Ok(postings) => postings,
        Err(e) => {
            tracing::error!("Crawling failed: {}", e);
            return RunSummary::default();
        }
    };

    tracing::info!(
        "Crawled {} raw postings ({} detail pages visited)",
        raw_postings.len(),
        budget.spent()
    );
    if raw_postings.is_empty() {
        tracing::warn!("No postings crawled — aborting pipeline.");
        return RunSummary::default();
    }

    // 2. Normalize + translate
    tracing::info!("STEP 2/3 — Normalizing and translating …");
    let guard = match TranslationGuard::with_default_backend() {
        Ok(guard) => guard,
        Err(e) => {
            tracing::error!("Failed to build translation client: {}", e);
            return RunSummary::default();
        }
    };

    let mut normalized = Vec::new();
    let mut skipped = 0;
    for (index, raw) in raw_postings.iter().enumerate() {
        let posting = match normalize_posting(raw, &config.source.source_name) {
            Some(posting) => posting,
            None => {
                skipped += 1;
                continue;
            }
        };

        // The guard is total; a failed translation falls back per field
        normalized.push(guard.translate_fields(&posting).await);

        if (index + 1) % 25 == 0 {
            tracing::info!("  Processed {}/{} postings …", index + 1, raw_postings.len());
        }
    }

    tracing::info!(
        "Normalization complete: {} valid, {} skipped (no identity key)",
        normalized.len(),
        skipped
    );
    if normalized.is_empty() {
        tracing::warn!("No valid postings after normalization — aborting pipeline.");
        return RunSummary::default();
    }

    // 3. Reconcile
    tracing::info!(
        "STEP 3/3 — Upserting to destination (table: {}) …",
        config.destination.table
    );
    let store = match DestinationStore::new(&config.destination) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to build destination client: {}", e);
            return RunSummary::default();
        }
    };
    let stats = ReconciliationEngine::new(store).upsert(&normalized).await;

    let elapsed = start.elapsed();
    tracing::info!("{}", banner);
    tracing::info!(
        "Pipeline complete in {:.1}s  |  inserted={}  updated={}  total={}",
        elapsed.as_secs_f64(),
        stats.inserted,
        stats.updated,
        stats.total()
    );
    tracing::info!("{}", banner);

    RunSummary {
        inserted: stats.inserted,
        updated: stats.updated,
    }
}
