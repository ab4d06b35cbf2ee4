use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Service base URL is an http(s) URL
/// - Server port is not 0
/// - Poll intervals and attempt counts are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Service validation
    let url = config.service.base_url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "service.base_url must be an http(s) URL, got: {url}"
        )));
    }

    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Polling validation
    if config.lesson.derived_poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "lesson.derived_poll_interval_ms cannot be 0".to_string(),
        ));
    }
    if config.lesson.derived_poll_max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "lesson.derived_poll_max_attempts cannot be 0".to_string(),
        ));
    }
    if config.bulk.status_poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "bulk.status_poll_interval_ms cannot be 0".to_string(),
        ));
    }

    Ok(())
}
