use crate::config::types::{ApiConfig, CategoryEntry, ClientConfig, Config, OutputConfig, ScrapeConfig};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_client_config(&config.client)?;
    validate_scrape_config(&config.scrape)?;
    validate_output_config(&config.output)?;
    validate_categories(&config.categories)?;
    Ok(())
}

fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    validate_http_url("base-url", &config.base_url)?;
    validate_http_url("referer", &config.referer)?;
    validate_http_url("site-root", &config.site_root)?;

    if config.page_size == 0 {
        return Err(ConfigError::Validation(
            "page-size must be at least 1".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be at least 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_client_config(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.discovery_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "discovery-timeout-secs must be at least 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_scrape_config(config: &ScrapeConfig) -> Result<(), ConfigError> {
    if config.stagnation_threshold == 0 {
        return Err(ConfigError::Validation(
            "stagnation-threshold must be at least 1".to_string(),
        ));
    }

    if !(1..=5).contains(&config.max_attempts) {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be between 1 and 5, got {}",
            config.max_attempts
        )));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (key, value) in [
        ("bronze-path", &config.bronze_path),
        ("silver-path", &config.silver_path),
        ("ledger-path", &config.ledger_path),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
        }
    }

    Ok(())
}

/// Category names become directory and file names in the bronze layer
fn validate_categories(categories: &[CategoryEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in categories {
        validate_category_name(&entry.name)?;

        if !seen.insert(entry.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Category '{}' is listed more than once",
                entry.name
            )));
        }

        validate_http_url(&format!("category '{}' url", entry.name), &entry.url)?;
    }

    Ok(())
}

fn validate_category_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "category name cannot be empty".to_string(),
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "category name must contain only letters, digits, '-' and '_', got '{}'",
            name
        )));
    }

    Ok(())
}

fn validate_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", key, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            key, value
        )));
    }

    Ok(())
}
