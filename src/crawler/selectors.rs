//! Selector table and URL templates for the search surface
//!
//! The markup carries two generations of class names for most fields, so
//! selectors are comma lists. These need updating whenever the site ships a
//! new layout; everything reading them degrades to defaults on a miss.

/// Site origin used to resolve relative card links
pub const ORIGIN: &str = "https://www.linkedin.com";

/// Login form URL
pub const LOGIN_URL: &str = "https://www.linkedin.com/login";

/// Listing pagination step used by the site's offset parameter
pub const PAGE_SIZE: u32 = 25;

// Search results
pub const JOB_CARDS: &str = "ul.jobs-search__results-list > li";
pub const JOB_CARD_LINK: &str = "a.base-card__full-link";

// Detail page
pub const JOB_TITLE: &str = "h1.top-card-layout__title, h1.jobs-unified-top-card__job-title";
pub const COMPANY: &str = "a.topcard__org-name-link, span.jobs-unified-top-card__company-name";
pub const LOCATION: &str = "span.topcard__flavor--bullet, span.jobs-unified-top-card__bullet";
pub const DESCRIPTION: &str = "div.description__text, div.jobs-description-content__text";
pub const CRITERIA_HEADERS: &str = "h3.description__job-criteria-subheader";
pub const CRITERIA_VALUES: &str = "span.description__job-criteria-text";

// Pagination
pub const NEXT_PAGE_BUTTON: &str = "li[data-test-pagination-page-btn].selected + li button";

// Login form
pub const LOGIN_EMAIL: &str = "#username";
pub const LOGIN_PASSWORD: &str = "#password";
pub const LOGIN_SUBMIT: &str =
    "button[data-litms-control-id='login-submit'], button[type='submit']";

/// Builds the paginated search URL for a query/location pair
///
/// `f_WT=2` filters to remote listings, `sortBy=DD` sorts by most recent.
pub fn search_url(query: &str, location: &str, offset: u32) -> String {
    let start = offset.to_string();
    let params = [
        ("keywords", query),
        ("location", location),
        ("f_WT", "2"),
        ("sortBy", "DD"),
        ("start", start.as_str()),
    ];
    let query_string = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish();
    format!("{ORIGIN}/jobs/search/?{query_string}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_query_and_location() {
        let url = search_url("remote developer", "São Paulo", 0);
        assert!(url.starts_with("https://www.linkedin.com/jobs/search/?"));
        assert!(url.contains("keywords=remote+developer"));
        assert!(url.contains("location=S%C3%A3o+Paulo"));
        assert!(url.contains("f_WT=2"));
        assert!(url.contains("sortBy=DD"));
        assert!(url.contains("start=0"));
    }

    #[test]
    fn test_search_url_offset_advances() {
        let url = search_url("rust", "Worldwide", 50);
        assert!(url.contains("start=50"));
    }
}
