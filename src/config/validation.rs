use crate::config::types::{Config, DestinationConfig, PacingConfig, SearchConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_destination(&config.destination)?;
    validate_search(&config.search)?;
    validate_pacing(&config.pacing)?;

    if config.schedule.run_interval_hours < 1 {
        return Err(ConfigError::Validation(format!(
            "run-interval-hours must be >= 1, got {}",
            config.schedule.run_interval_hours
        )));
    }

    Ok(())
}

/// Validates the destination store configuration
fn validate_destination(config: &DestinationConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.url)
        .map_err(|_| ConfigError::InvalidUrl(config.url.clone()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "destination url must be http(s), got '{}'",
            config.url
        )));
    }

    if config.service_key.trim().is_empty() {
        return Err(ConfigError::Validation(
            "destination service-key cannot be empty".to_string(),
        ));
    }

    if config.table.trim().is_empty() {
        return Err(ConfigError::Validation(
            "destination table cannot be empty".to_string(),
        ));
    }

    if config.conflict_column.trim().is_empty() {
        return Err(ConfigError::Validation(
            "destination conflict-column cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the search traversal configuration
fn validate_search(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.queries.iter().all(|q| q.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "search queries cannot be empty".to_string(),
        ));
    }

    if config.locations.iter().all(|l| l.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "search locations cannot be empty".to_string(),
        ));
    }

    if config.max_postings_per_run < 1 {
        return Err(ConfigError::Validation(format!(
            "max-postings-per-run must be >= 1, got {}",
            config.max_postings_per_run
        )));
    }

    Ok(())
}

/// Validates the pacing configuration
fn validate_pacing(config: &PacingConfig) -> Result<(), ConfigError> {
    if config.delay_min_ms > config.delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "delay-min-ms ({}) must be <= delay-max-ms ({})",
            config.delay_min_ms, config.delay_max_ms
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;

    fn valid_config() -> Config {
        Config {
            destination: DestinationConfig {
                url: "https://example.supabase.co".to_string(),
                service_key: "sb_secret_test".to_string(),
                table: "jobs".to_string(),
                schema: "public".to_string(),
                conflict_column: "source_url".to_string(),
            },
            source: SourceConfig::default(),
            search: SearchConfig::default(),
            pacing: PacingConfig::default(),
            browser: BrowserConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_rejects_bad_destination_url() {
        let mut config = valid_config();
        config.destination.url = "not a url".to_string();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::InvalidUrl(_)
        ));
    }

    #[test]
    fn test_rejects_non_http_destination_url() {
        let mut config = valid_config();
        config.destination.url = "ftp://example.com".to_string();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::InvalidUrl(_)
        ));
    }

    #[test]
    fn test_rejects_empty_service_key() {
        let mut config = valid_config();
        config.destination.service_key = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_empty_queries() {
        let mut config = valid_config();
        config.search.queries = vec!["".to_string()];
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_zero_budget() {
        let mut config = valid_config();
        config.search.max_postings_per_run = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_inverted_pacing_bounds() {
        let mut config = valid_config();
        config.pacing.delay_min_ms = 10_000;
        config.pacing.delay_max_ms = 100;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_equal_pacing_bounds_allowed() {
        let mut config = valid_config();
        config.pacing.delay_min_ms = 1_000;
        config.pacing.delay_max_ms = 1_000;
        assert!(validate(&config).is_ok());
    }
}
