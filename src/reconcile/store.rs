//! Destination store client (PostgREST-style REST)
//!
//! Two operations: an existence check filtered by an in-list predicate on the
//! identity column, and a merge-upsert POST keyed on the same column. The
//! destination's own report of affected rows does not distinguish insert from
//! update under merge semantics, which is why the existence check exists.

use std::collections::HashSet;
use std::time::Duration;

use serde::Serialize;

use crate::config::DestinationConfig;
use crate::{HarvestError, Result};

/// Response bodies are truncated to this length in error messages
const ERROR_BODY_LIMIT: usize = 300;

/// HTTP client for the destination table
#[derive(Debug, Clone)]
pub struct DestinationStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    table: String,
    schema: String,
    conflict_column: String,
}

impl DestinationStore {
    pub fn new(config: &DestinationConfig) -> std::result::Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            service_key: config.service_key.clone(),
            table: config.table.clone(),
            schema: config.schema.clone(),
            conflict_column: config.conflict_column.clone(),
        })
    }

    /// The identity column the merge-upsert conflicts on
    pub fn conflict_column(&self) -> &str {
        &self.conflict_column
    }

    fn table_url(&self) -> String {
        format!("{}/{}", self.base_url, self.table)
    }

    fn apply_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let mut request = request
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key));
        if self.schema != "public" {
            request = request
                .header("Accept-Profile", &self.schema)
                .header("Content-Profile", &self.schema);
        }
        request
    }

    /// Returns which of `keys` already exist in the destination table
    pub async fn fetch_existing_keys(&self, keys: &[String]) -> Result<HashSet<String>> {
        let quoted: Vec<String> = keys.iter().map(|k| format!("\"{}\"", k)).collect();
        let filter = format!("in.({})", quoted.join(","));

        let request = self.client.get(self.table_url()).query(&[
            (self.conflict_column.as_str(), filter.as_str()),
            ("select", self.conflict_column.as_str()),
        ]);
        let response = self.apply_headers(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.error_from(status.as_u16(), response).await);
        }

        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| HarvestError::DestinationBody(e.to_string()))?;

        Ok(rows
            .iter()
            .filter_map(|row| row.get(&self.conflict_column).and_then(|v| v.as_str()))
            .map(String::from)
            .collect())
    }

    /// Submits `rows` as a single merge-upsert keyed on the identity column
    pub async fn upsert_rows<T: Serialize + ?Sized>(&self, rows: &T) -> Result<()> {
        let request = self
            .client
            .post(self.table_url())
            .query(&[("on_conflict", self.conflict_column.as_str())])
            .header("Prefer", "resolution=merge-duplicates")
            .json(rows);
        let response = self.apply_headers(request).send().await?;

        match response.status().as_u16() {
            200 | 201 | 204 => Ok(()),
            status => Err(self.error_from(status, response).await),
        }
    }

    /// Connectivity probe used by the smoke test: select a single identity
    /// value, returning the HTTP status
    pub async fn probe(&self) -> Result<u16> {
        let request = self.client.get(self.table_url()).query(&[
            ("select", self.conflict_column.as_str()),
            ("limit", "1"),
        ]);
        let response = self.apply_headers(request).send().await?;
        Ok(response.status().as_u16())
    }

    async fn error_from(&self, status: u16, response: reqwest::Response) -> HarvestError {
        let body = response.text().await.unwrap_or_default();
        let body: String = body.chars().take(ERROR_BODY_LIMIT).collect();
        HarvestError::Destination { status, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DestinationStore {
        DestinationStore::new(&DestinationConfig {
            url: "https://example.supabase.co/".to_string(),
            service_key: "sb_secret_test".to_string(),
            table: "jobs".to_string(),
            schema: "public".to_string(),
            conflict_column: "source_url".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_table_url_strips_trailing_slash() {
        assert_eq!(
            store().table_url(),
            "https://example.supabase.co/rest/v1/jobs"
        );
    }
}
