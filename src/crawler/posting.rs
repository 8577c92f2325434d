use crate::config::SearchConfig;

/// One (query, location) pair driving one traversal of the search surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriterion {
    pub query: String,
    pub location: String,
}

/// Enumerates criteria as the queries × locations cross-product, in
/// configuration order, skipping blank entries
pub fn build_criteria(search: &SearchConfig) -> Vec<SearchCriterion> {
    let mut criteria = Vec::new();
    for query in &search.queries {
        if query.trim().is_empty() {
            continue;
        }
        for location in &search.locations {
            if location.trim().is_empty() {
                continue;
            }
            criteria.push(SearchCriterion {
                query: query.trim().to_string(),
                location: location.trim().to_string(),
            });
        }
    }
    criteria
}

/// A posting as extracted from a detail page, before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub employment_type: String,
    /// Canonical identity key (absolute URL, query parameters stripped)
    pub source_url: String,
}

impl RawPosting {
    /// A posting is usable iff it has an identity key and at least one of
    /// title or company survived extraction
    pub fn is_valid(&self) -> bool {
        !self.source_url.is_empty()
            && (!self.title.trim().is_empty() || !self.company.trim().is_empty())
    }
}
