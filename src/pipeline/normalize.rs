//! Posting normalization
//!
//! Produces the durable record shape: canonical identity URL, trimmed
//! fields, provenance source name, and a scrape timestamp. A posting without
//! a valid identity key is unusable and is dropped here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::crawler::RawPosting;

/// A posting ready for translation and reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub employment_type: String,
    /// Canonical identity key: absolute URL, query parameters stripped
    pub source_url: String,
    /// Provenance source name
    pub source: String,
    /// When this run scraped the posting
    pub scraped_at: DateTime<Utc>,
}

/// Canonicalizes an identity URL: absolute http(s), query and fragment
/// stripped. None for anything else.
pub fn canonical_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut url = Url::parse(trimmed).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_query(None);
    url.set_fragment(None);
    Some(url.to_string())
}

/// Normalizes a raw posting, stamping provenance; None when the posting has
/// no usable identity key or neither title nor company
pub fn normalize_posting(raw: &RawPosting, source: &str) -> Option<NormalizedPosting> {
    let source_url = canonical_url(&raw.source_url)?;

    if raw.title.trim().is_empty() && raw.company.trim().is_empty() {
        return None;
    }

    Some(NormalizedPosting {
        title: raw.title.trim().to_string(),
        company: raw.company.trim().to_string(),
        location: raw.location.trim().to_string(),
        description: raw.description.trim().to_string(),
        employment_type: raw.employment_type.trim().to_string(),
        source_url,
        source: source.to_string(),
        scraped_at: Utc::now(),
    })
}
