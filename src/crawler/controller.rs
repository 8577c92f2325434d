//! Budgeted, paced traversal of the search surface
//!
//! For each (query, location) criterion the controller paginates the search
//! results, scrolls to materialize lazy content, collects unseen detail URLs,
//! then visits each detail page within the shared job budget. Navigation
//! failures end the unit of work they belong to (a page, a posting) without
//! aborting the run; only browser launch failures propagate. A randomized
//! delay runs between every network-incurring action: too-fast traversal
//! risks the remote source blocking the crawl entirely.

use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;
use scraper::{Html, Selector};
use url::Url;

use crate::browser::{extract, BrowserSession};
use crate::config::Config;
use crate::crawler::budget::JobBudget;
use crate::crawler::posting::{RawPosting, SearchCriterion};
use crate::crawler::selectors;
use crate::{HarvestError, Result};

/// Crawls all criteria within `budget`, returning the raw postings
///
/// Establishes one browser session for the whole call; teardown runs on
/// every exit path so sessions never leak across scheduled runs.
pub async fn crawl(
    config: &Config,
    criteria: &[SearchCriterion],
    budget: &mut JobBudget,
) -> Result<Vec<RawPosting>> {
    let session = BrowserSession::launch(&config.browser).await?;

    let postings = {
        let crawler = Crawler {
            config,
            session: &session,
        };
        crawler.run(criteria, budget).await
    };

    session.close().await;
    Ok(postings)
}

struct Crawler<'a> {
    config: &'a Config,
    session: &'a BrowserSession,
}

impl Crawler<'_> {
    async fn run(&self, criteria: &[SearchCriterion], budget: &mut JobBudget) -> Vec<RawPosting> {
        self.login().await;

        let mut postings = Vec::new();
        for criterion in criteria {
            if budget.is_exhausted() {
                break;
            }

            tracing::info!(
                "Crawling query='{}' location='{}' (remaining budget: {})",
                criterion.query,
                criterion.location,
                budget.remaining()
            );

            let urls = self
                .collect_listing_urls(criterion, budget.remaining())
                .await;
            tracing::info!("  Collected {} posting URLs", urls.len());

            for url in urls {
                // Single budget checkpoint: one unit per detail-page visit
                if !budget.try_spend() {
                    break;
                }
                if let Some(posting) = self.extract_detail(&url).await {
                    postings.push(posting);
                }
                self.pace().await;
            }
        }

        tracing::info!("Crawl complete. Total raw postings: {}", postings.len());
        postings
    }

    /// Attempts login when credentials are configured. Failure is non-fatal;
    /// the search surface is usable without authentication.
    async fn login(&self) -> bool {
        if !self.config.source.has_credentials() {
            tracing::info!("No source credentials configured; crawling without login.");
            return false;
        }

        match self.try_login().await {
            Ok(true) => {
                tracing::info!("Login successful.");
                true
            }
            Ok(false) => {
                tracing::warn!("Login may have failed — continuing without authentication.");
                false
            }
            Err(e) => {
                tracing::warn!("Login error: {} — continuing without authentication.", e);
                false
            }
        }
    }

    async fn try_login(&self) -> Result<bool> {
        tracing::info!("Logging in as {} …", self.config.source.email);
        self.session.goto(selectors::LOGIN_URL).await?;
        self.pace_between(1_000, 2_000).await;

        self.session
            .type_into(selectors::LOGIN_EMAIL, &self.config.source.email)
            .await?;
        self.pace_between(500, 1_000).await;
        self.session
            .type_into(selectors::LOGIN_PASSWORD, &self.config.source.password)
            .await?;
        self.pace_between(500, 1_000).await;

        self.session.click(selectors::LOGIN_SUBMIT).await?;
        self.session.wait_for_navigation().await?;

        let landed = self.session.current_url().await?;
        Ok(landed.contains("/feed") || landed.contains("mynetwork") || landed.contains("jobs"))
    }

    /// Paginates the search results for one criterion, collecting detail URLs
    /// until `max_count` is reached or the results end
    async fn collect_listing_urls(&self, criterion: &SearchCriterion, max_count: u32) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut offset = 0;

        while (urls.len() as u32) < max_count {
            let page_url = selectors::search_url(&criterion.query, &criterion.location, offset);
            tracing::info!(
                "  Fetching search page: offset={} (collected so far: {})",
                offset,
                urls.len()
            );

            match self.session.goto(&page_url).await {
                Ok(()) => {}
                Err(HarvestError::NavigationTimeout { .. }) => {
                    tracing::warn!(
                        "  Timeout on search page at offset {} — stopping pagination",
                        offset
                    );
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        "  Navigation error at offset {}: {} — stopping pagination",
                        offset,
                        e
                    );
                    break;
                }
            }

            self.pace().await;

            // Scroll to trigger lazy loading
            for _ in 0..3 {
                if self.session.scroll_page_fraction().await.is_err() {
                    break;
                }
                self.pace_between(500, 1_000).await;
            }

            let html = match self.session.html().await {
                Ok(html) => html,
                Err(e) => {
                    tracing::warn!("  Could not snapshot search page: {} — stopping pagination", e);
                    break;
                }
            };

            let listing = parse_listing(&html);
            if listing.card_count == 0 {
                tracing::info!("  No job cards found — end of results.");
                break;
            }

            let mut added = 0;
            for url in listing.urls {
                if seen.insert(url.clone()) {
                    urls.push(url);
                    added += 1;
                }
            }
            if added == 0 {
                tracing::info!("  No new URLs on this page — stopping pagination.");
                break;
            }
            tracing::debug!("  +{} URLs from this page (total: {})", added, urls.len());

            if !listing.has_next {
                tracing::info!("  No next-page control — reached last page.");
                break;
            }

            offset += selectors::PAGE_SIZE;
            self.pace().await;
        }

        urls.truncate(max_count as usize);
        urls
    }

    /// Visits a detail page and extracts a posting; None on any failure.
    /// An extraction gap is not retried; a second load of the same URL is
    /// assumed to reproduce it.
    async fn extract_detail(&self, url: &str) -> Option<RawPosting> {
        match self.session.goto(url).await {
            Ok(()) => {}
            Err(HarvestError::NavigationTimeout { .. }) => {
                tracing::warn!("  Timeout loading {} — skipping", url);
                return None;
            }
            Err(e) => {
                tracing::warn!("  Error loading {}: {} — skipping", url, e);
                return None;
            }
        }

        self.pace_between(1_500, 3_000).await;

        let html = match self.session.html().await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("  Could not snapshot {}: {} — skipping", url, e);
                return None;
            }
        };

        let posting = parse_detail(&html, url);
        if posting.is_none() {
            tracing::debug!("  No title/company found at {} — skipping", url);
        }
        posting
    }

    /// Randomized human-cadence delay, uniform over the configured interval
    async fn pace(&self) {
        let pacing = &self.config.pacing;
        self.pace_between(pacing.delay_min_ms, pacing.delay_max_ms).await;
    }

    async fn pace_between(&self, min_ms: u64, max_ms: u64) {
        let wait_ms = {
            let mut rng = rand::thread_rng();
            rng.gen_range(min_ms..=max_ms)
        };
        tokio::time::sleep(Duration::from_millis(wait_ms)).await;
    }
}

/// One parsed search-results page
pub(crate) struct ListingSnapshot {
    pub card_count: usize,
    pub urls: Vec<String>,
    pub has_next: bool,
}

/// Parses a search-results snapshot: cards, canonical detail URLs, and
/// whether an enabled next-page control is present
pub(crate) fn parse_listing(html: &str) -> ListingSnapshot {
    let document = Html::parse_document(html);
    let mut snapshot = ListingSnapshot {
        card_count: 0,
        urls: Vec::new(),
        has_next: false,
    };

    if let (Ok(cards), Ok(link)) = (
        Selector::parse(selectors::JOB_CARDS),
        Selector::parse(selectors::JOB_CARD_LINK),
    ) {
        for card in document.select(&cards) {
            snapshot.card_count += 1;
            if let Some(href) = card
                .select(&link)
                .next()
                .and_then(|a| a.value().attr("href"))
            {
                if let Some(url) = canonical_card_url(href) {
                    snapshot.urls.push(url);
                }
            }
        }
    }

    snapshot.has_next = next_page_enabled(&document);
    snapshot
}

fn next_page_enabled(document: &Html) -> bool {
    if let Ok(selector) = Selector::parse(selectors::NEXT_PAGE_BUTTON) {
        if let Some(button) = document.select(&selector).next() {
            return button.value().attr("disabled").is_none();
        }
    }
    false
}

/// Resolves a card href against the site origin and strips query/fragment,
/// yielding the canonical identity URL
fn canonical_card_url(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let base = Url::parse(selectors::ORIGIN).ok()?;
    let mut url = base.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_query(None);
    url.set_fragment(None);
    Some(url.to_string())
}

/// Extracts a posting from a detail-page snapshot; None when neither title
/// nor company survived extraction
pub(crate) fn parse_detail(html: &str, url: &str) -> Option<RawPosting> {
    let document = Html::parse_document(html);

    let posting = RawPosting {
        title: extract::text(&document, selectors::JOB_TITLE, "").into_value(),
        company: extract::text(&document, selectors::COMPANY, "").into_value(),
        location: extract::text(&document, selectors::LOCATION, "").into_value(),
        description: extract::text(&document, selectors::DESCRIPTION, "").into_value(),
        employment_type: employment_type(&document),
        source_url: url.to_string(),
    };

    posting.is_valid().then_some(posting)
}

/// The employment type lives in a criteria list, keyed by its header text
fn employment_type(document: &Html) -> String {
    let headers = extract::text_all(document, selectors::CRITERIA_HEADERS);
    let values = extract::text_all(document, selectors::CRITERIA_VALUES);
    headers
        .iter()
        .zip(values)
        .find(|(header, _)| header.to_lowercase().contains("employment type"))
        .map(|(_, value)| value)
        .unwrap_or_default()
}
