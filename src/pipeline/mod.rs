//! Pipeline orchestrator
//!
//! Sequences crawl, normalize/translate, and reconcile with per-item failure
//! isolation. All entities are transient and rebuilt from scratch each run;
//! the only durable state is the remote table.

pub mod normalize;
mod orchestrator;

pub use normalize::{canonical_url, normalize_posting, NormalizedPosting};
pub use orchestrator::{run_pipeline, RunSummary};
