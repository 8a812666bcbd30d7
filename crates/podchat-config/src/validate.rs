//! Configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::ChatConfig;

/// Upper bound for `listeners.initial_capacity`.
const MAX_INITIAL_CAPACITY: usize = 4096;

/// Validate a deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &ChatConfig) -> ConfigResult<()> {
    validate_logging(config)?;
    validate_listeners(config)?;
    Ok(())
}

fn validate_logging(config: &ChatConfig) -> ConfigResult<()> {
    config
        .logging
        .build_filter()
        .map_err(|e| ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: e.to_string(),
        })?;
    Ok(())
}

fn validate_listeners(config: &ChatConfig) -> ConfigResult<()> {
    let l = &config.listeners;

    if l.initial_capacity > MAX_INITIAL_CAPACITY {
        return Err(ConfigError::ValidationError {
            field: "listeners.initial_capacity".to_owned(),
            message: format!(
                "{} exceeds the maximum of {MAX_INITIAL_CAPACITY}",
                l.initial_capacity
            ),
        });
    }

    if l.max_listeners == Some(0) {
        return Err(ConfigError::ValidationError {
            field: "listeners.max_listeners".to_owned(),
            message: "must be at least 1; omit it to disable the check".to_owned(),
        });
    }

    Ok(())
}
