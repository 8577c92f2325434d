use serde::Deserialize;

/// Main configuration structure for greenharvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub destination: DestinationConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Destination store (PostgREST-style) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DestinationConfig {
    /// Base URL of the destination project (e.g. "https://xyz.supabase.co")
    pub url: String,

    /// Service role key used for both `apikey` and bearer auth
    #[serde(rename = "service-key")]
    pub service_key: String,

    /// Target table name
    #[serde(default = "default_table")]
    pub table: String,

    /// Target schema; non-"public" schemas are sent via profile headers
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Unique column the merge-upsert conflicts on
    #[serde(rename = "conflict-column", default = "default_conflict_column")]
    pub conflict_column: String,
}

/// Optional source-site credentials and provenance labelling
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Login email; empty means crawl without authentication
    #[serde(default)]
    pub email: String,

    /// Login password
    #[serde(default)]
    pub password: String,

    /// Provenance name stamped onto every normalized posting
    #[serde(rename = "source-name", default = "default_source_name")]
    pub source_name: String,
}

/// Search traversal configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Search query terms; crossed with `locations` to form criteria
    #[serde(default = "default_queries")]
    pub queries: Vec<String>,

    /// Location strings; crossed with `queries` to form criteria
    #[serde(default = "default_locations")]
    pub locations: Vec<String>,

    /// Global cap on detail pages visited per run, shared across criteria
    #[serde(rename = "max-postings-per-run", default = "default_max_postings")]
    pub max_postings_per_run: u32,
}

/// Randomized pacing between network-incurring browser actions
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Lower bound of the uniform delay, milliseconds
    #[serde(rename = "delay-min-ms", default = "default_delay_min_ms")]
    pub delay_min_ms: u64,

    /// Upper bound of the uniform delay, milliseconds
    #[serde(rename = "delay-max-ms", default = "default_delay_max_ms")]
    pub delay_max_ms: u64,
}

/// Browser session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Run the browser without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Per-navigation timeout, milliseconds
    #[serde(rename = "navigation-timeout-ms", default = "default_nav_timeout_ms")]
    pub navigation_timeout_ms: u64,
}

/// Scheduler configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Hours between pipeline runs in scheduler mode
    #[serde(rename = "run-interval-hours", default = "default_interval_hours")]
    pub run_interval_hours: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            source_name: default_source_name(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            queries: default_queries(),
            locations: default_locations(),
            max_postings_per_run: default_max_postings(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            delay_min_ms: default_delay_min_ms(),
            delay_max_ms: default_delay_max_ms(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            navigation_timeout_ms: default_nav_timeout_ms(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            run_interval_hours: default_interval_hours(),
        }
    }
}

impl SourceConfig {
    /// Whether login credentials are configured
    pub fn has_credentials(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }
}

fn default_table() -> String {
    "jobs".to_string()
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_conflict_column() -> String {
    "source_url".to_string()
}

fn default_source_name() -> String {
    "LinkedIn".to_string()
}

fn default_queries() -> Vec<String> {
    vec![
        "remote developer".to_string(),
        "remote software engineer".to_string(),
        "remote python developer".to_string(),
    ]
}

fn default_locations() -> Vec<String> {
    vec!["Worldwide".to_string()]
}

fn default_max_postings() -> u32 {
    150
}

fn default_delay_min_ms() -> u64 {
    2_000
}

fn default_delay_max_ms() -> u64 {
    5_000
}

fn default_headless() -> bool {
    true
}

fn default_nav_timeout_ms() -> u64 {
    30_000
}

fn default_interval_hours() -> u32 {
    6
}
