//! Greenharvest: a remote-job ingestion pipeline
//!
//! This crate repeatedly harvests remote-job postings from a paginated search
//! surface, defensively extracts structured fields from each posting,
//! translates non-English text, and reconciles the result set against a
//! remote table keyed by the canonical posting URL.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod pipeline;
pub mod reconcile;
pub mod retry;
pub mod translate;

use thiserror::Error;

/// Main error type for greenharvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("Navigation timeout for {url}")]
    NavigationTimeout { url: String },

    #[error("Destination rejected request: HTTP {status} — {body}")]
    Destination { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Malformed destination response: {0}")]
    DestinationBody(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for greenharvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{JobBudget, RawPosting, SearchCriterion};
pub use pipeline::{run_pipeline, NormalizedPosting, RunSummary};
pub use reconcile::UpsertStats;
