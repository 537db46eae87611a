use crate::config::types::{Config, FetcherConfig, RecordOptions, SearchConstraints};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_constraints(&config.search)?;
    validate_record_options(&config.record)?;
    validate_fetcher_config(&config.fetcher)?;
    Ok(())
}

/// Validates search constraints
fn validate_search_constraints(search: &SearchConstraints) -> Result<(), ConfigError> {
    for tag in &search.contains_tags {
        validate_tag_name(tag, "contains-tags")?;
    }

    if search.max_concurrent_fetches == Some(0) {
        return Err(ConfigError::Validation(
            "max-concurrent-fetches must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates recording options
fn validate_record_options(record: &RecordOptions) -> Result<(), ConfigError> {
    for tag in &record.tags {
        validate_tag_name(tag, "record.tags")?;
    }

    if !record.tags.is_empty() && record.attr.trim().is_empty() {
        return Err(ConfigError::Validation(
            "record.attr must be set when record.tags is non-empty".to_string(),
        ));
    }

    if record.attr.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "record.attr cannot contain whitespace, got '{}'",
            record.attr
        )));
    }

    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(fetcher: &FetcherConfig) -> Result<(), ConfigError> {
    if fetcher.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if fetcher.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            fetcher.timeout_secs
        )));
    }

    Ok(())
}

/// Validates an HTML tag name used to build element selectors
fn validate_tag_name(tag: &str, field: &str) -> Result<(), ConfigError> {
    if tag.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} cannot contain an empty tag name",
            field
        )));
    }

    if !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "{} tag '{}' must contain only ASCII alphanumerics and hyphens",
            field, tag
        )));
    }

    if !tag.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(ConfigError::Validation(format!(
            "{} tag '{}' must start with a letter",
            field, tag
        )));
    }

    Ok(())
}
