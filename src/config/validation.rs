use crate::config::types::{Config, CrawlerConfig, ServerConfig, StorageConfig, UserAgentConfig};
use crate::ConfigError;
use std::net::SocketAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_storage_config(&config.storage)?;
    validate_server_config(&config.server)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' has no host",
            config.base_url
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent name cannot be empty".to_string(),
        ));
    }

    if !config
        .name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "user-agent name must contain only alphanumeric characters, '-' or '_', got '{}'",
            config.name
        )));
    }

    Ok(())
}

/// Validates storage layout
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "storage root cannot be empty".to_string(),
        ));
    }

    validate_dir_name("airports-dir", &config.airports_dir)?;
    validate_dir_name("lounges-dir", &config.lounges_dir)?;

    if config.airports_dir == config.lounges_dir {
        return Err(ConfigError::Validation(format!(
            "airports-dir and lounges-dir must differ, both are '{}'",
            config.airports_dir
        )));
    }

    Ok(())
}

/// A store subdirectory must be a single plain path component
fn validate_dir_name(key: &str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(ConfigError::Validation(format!(
            "{} must be a directory name, got '{}'",
            key, name
        )));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(ConfigError::Validation(format!(
            "{} cannot contain path separators, got '{}'",
            key, name
        )));
    }

    Ok(())
}

/// Validates query server configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.bind.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!("Invalid bind address '{}': {}", config.bind, e))
    })?;

    if config.cache_ttl_secs == 0 {
        return Err(ConfigError::Validation(
            "cache_ttl_secs must be >= 1".to_string(),
        ));
    }

    if !config.default_radius_km.is_finite() || config.default_radius_km <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "default_radius_km must be a positive number, got {}",
            config.default_radius_km
        )));
    }

    Ok(())
}
