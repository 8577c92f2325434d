//! Integration tests for the reconciliation engine
//!
//! These use wiremock to stand in for the destination's REST surface and
//! exercise the existence-diff counting, merge-upsert submission, retry, and
//! partial-failure isolation end-to-end.

use std::time::Duration;

use chrono::Utc;
use greenharvest::config::DestinationConfig;
use greenharvest::pipeline::NormalizedPosting;
use greenharvest::reconcile::{DestinationStore, ReconciliationEngine};
use greenharvest::retry::RetryPolicy;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn destination_config(base_url: &str) -> DestinationConfig {
    DestinationConfig {
        url: base_url.to_string(),
        service_key: "sb_secret_test".to_string(),
        table: "jobs".to_string(),
        schema: "public".to_string(),
        conflict_column: "source_url".to_string(),
    }
}

fn engine(base_url: &str) -> ReconciliationEngine {
    let store = DestinationStore::new(&destination_config(base_url)).expect("client builds");
    // Fast schedule so retry paths don't slow the suite down
    ReconciliationEngine::with_retry(
        store,
        RetryPolicy::new(4, Duration::from_millis(1), Duration::from_millis(5)),
    )
}

fn posting(url: &str) -> NormalizedPosting {
    NormalizedPosting {
        title: "Engineer".to_string(),
        company: "Acme".to_string(),
        location: "Remote".to_string(),
        description: "desc".to_string(),
        employment_type: "Full-time".to_string(),
        source_url: url.to_string(),
        source: "LinkedIn".to_string(),
        scraped_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_mixed_batch_counts_inserts_and_updates() {
    let server = MockServer::start().await;

    // Two of the three identity keys already exist remotely
    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .and(header("apikey", "sb_secret_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"source_url": "https://example.com/jobs/1"},
            {"source_url": "https://example.com/jobs/2"}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/jobs"))
        .and(query_param("on_conflict", "source_url"))
        .and(header("Prefer", "resolution=merge-duplicates"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let postings = vec![
        posting("https://example.com/jobs/1"),
        posting("https://example.com/jobs/2"),
        posting("https://example.com/jobs/3"),
    ];

    let stats = engine(&server.uri()).upsert(&postings).await;
    assert_eq!(stats.inserted, 1);
    assert_eq!(stats.updated, 2);
}

#[tokio::test]
async fn test_second_run_is_all_updates() {
    let server = MockServer::start().await;

    // First existence check: nothing exists yet
    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // Afterwards both keys exist
    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"source_url": "https://example.com/jobs/1"},
            {"source_url": "https://example.com/jobs/2"}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let postings = vec![
        posting("https://example.com/jobs/1"),
        posting("https://example.com/jobs/2"),
    ];
    let engine = engine(&server.uri());

    let first = engine.upsert(&postings).await;
    assert_eq!((first.inserted, first.updated), (2, 0));

    let second = engine.upsert(&postings).await;
    assert_eq!((second.inserted, second.updated), (0, 2));
}

#[tokio::test]
async fn test_duplicate_keys_within_batch_counted_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let postings = vec![
        posting("https://example.com/jobs/1"),
        posting("https://example.com/jobs/1"),
        posting("https://example.com/jobs/2"),
    ];

    let stats = engine(&server.uri()).upsert(&postings).await;
    assert_eq!(stats.inserted, 2);
    assert_eq!(stats.updated, 0);
}

#[tokio::test]
async fn test_transient_failures_are_retried_then_succeed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    // Two 503s, then success — within the 4-attempt budget
    Mock::given(method("POST"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let postings = vec![posting("https://example.com/jobs/1")];
    let stats = engine(&server.uri()).upsert(&postings).await;
    assert_eq!(stats.inserted, 1);
    assert_eq!(stats.updated, 0);
}

#[tokio::test]
async fn test_terminal_batch_failure_is_skipped_not_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    // Persistent outage: all 4 attempts fail
    Mock::given(method("POST"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .expect(4)
        .mount(&server)
        .await;

    let postings = vec![posting("https://example.com/jobs/1")];
    let stats = engine(&server.uri()).upsert(&postings).await;
    assert_eq!(stats.inserted, 0);
    assert_eq!(stats.updated, 0);
}

#[tokio::test]
async fn test_non_transient_failure_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    // 401 is not transient; exactly one attempt expected
    Mock::given(method("POST"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .expect(1)
        .mount(&server)
        .await;

    let postings = vec![posting("https://example.com/jobs/1")];
    let stats = engine(&server.uri()).upsert(&postings).await;
    assert_eq!(stats.total(), 0);
}

#[tokio::test]
async fn test_batches_are_isolated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    // First batch fails terminally (4 attempts), second batch succeeds
    Mock::given(method("POST"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(4)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    // 51 postings → two batches (50 + 1)
    let postings: Vec<_> = (0..51)
        .map(|i| posting(&format!("https://example.com/jobs/{}", i)))
        .collect();

    let stats = engine(&server.uri()).upsert(&postings).await;
    // Only the second (single-posting) batch lands
    assert_eq!(stats.inserted, 1);
    assert_eq!(stats.updated, 0);
}

#[tokio::test]
async fn test_inserted_plus_updated_bounded_by_submitted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"source_url": "https://example.com/jobs/0"}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let postings: Vec<_> = (0..7)
        .map(|i| posting(&format!("https://example.com/jobs/{}", i)))
        .collect();

    let stats = engine(&server.uri()).upsert(&postings).await;
    assert!(stats.total() <= postings.len() as u64);
    assert_eq!(stats.total(), 7);
    assert_eq!(stats.updated, 1);
}
