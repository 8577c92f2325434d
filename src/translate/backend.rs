//! Translation transport
//!
//! One text field in, one translated field out. The source language is always
//! supplied explicitly, never "auto": an unresolvable auto-detected source is
//! a known upstream failure mode the guard layer exists to avoid.

use std::time::Duration;

use thiserror::Error;

/// Default translation endpoint (gtx JSON API)
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com";

/// Errors from a single translation call
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Translation endpoint returned HTTP {0}")]
    Status(u16),

    #[error("Malformed translation response")]
    Malformed,
}

impl TranslateError {
    /// Whether a retry can plausibly change the outcome
    pub fn is_transient(&self) -> bool {
        match self {
            TranslateError::Http(e) => e.is_timeout() || e.is_connect(),
            TranslateError::Status(status) => *status >= 500 || *status == 429,
            TranslateError::Malformed => false,
        }
    }
}

/// Client for the translation endpoint
#[derive(Debug, Clone)]
pub struct TranslateBackend {
    client: reqwest::Client,
    base_url: String,
}

impl TranslateBackend {
    /// Builds a client against `base_url` (injectable for tests)
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn default_endpoint() -> Result<Self, reqwest::Error> {
        Self::new(DEFAULT_ENDPOINT)
    }

    /// Translates `text` from `source_lang` (ISO-639-1) to English
    pub async fn translate(&self, text: &str, source_lang: &str) -> Result<String, TranslateError> {
        let url = format!("{}/translate_a/single", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", source_lang),
                ("tl", "en"),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|_| TranslateError::Malformed)?;
        parse_segments(&body).ok_or(TranslateError::Malformed)
    }
}

/// The endpoint answers with nested arrays; segment texts live at `[0][i][0]`
fn parse_segments(body: &serde_json::Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;
    let mut out = String::new();
    for segment in segments {
        if let Some(chunk) = segment.get(0).and_then(|v| v.as_str()) {
            out.push_str(chunk);
        }
    }
    Some(out)
}
