//! Config file loading.

use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::types::ChatConfig;
use crate::validate;

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Environment variable overriding `logging.level`.
pub const LOG_LEVEL_ENV: &str = "PODCHAT_LOG";

/// Parse and validate configuration from a TOML string.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the text is malformed or fails validation.
pub fn load_str(content: &str) -> ConfigResult<ChatConfig> {
    parse(content, "<inline>")
}

/// Load a config from a specific file path.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, is too large, is
/// malformed, or fails validation.
pub fn load_file(path: &Path) -> ConfigResult<ChatConfig> {
    match try_read(path)? {
        Some(content) => parse(&content, &path.display().to_string()),
        None => Err(ConfigError::ReadError {
            path: path.display().to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }),
    }
}

/// Load a config file if present, falling back to defaults when it is
/// missing.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file exists but cannot be loaded.
pub fn load_optional(path: &Path) -> ConfigResult<ChatConfig> {
    match try_read(path)? {
        Some(content) => parse(&content, &path.display().to_string()),
        None => Ok(ChatConfig::default()),
    }
}

/// Apply environment overrides using `lookup` to resolve variables.
///
/// # Errors
///
/// Returns a [`ConfigError`] if an override produces an invalid config.
pub fn apply_env_overrides<F>(config: &mut ChatConfig, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(level) = lookup(LOG_LEVEL_ENV) {
        debug!(env = LOG_LEVEL_ENV, level = %level, "log level overridden from environment");
        config.logging.level = level;
    }
    validate::validate(config)
}

fn parse(content: &str, origin: &str) -> ConfigResult<ChatConfig> {
    let config: ChatConfig = toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: origin.to_owned(),
        source: e,
    })?;
    validate::validate(&config)?;
    debug!(origin, "config loaded");
    Ok(config)
}

/// Read a file, returning `None` if it doesn't exist.
fn try_read(path: &Path) -> ConfigResult<Option<String>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                content.len()
            ),
        });
    }

    Ok(Some(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use podchat_telemetry::LogFormat;
    use std::io::Write;

    #[test]
    fn test_load_str_full() {
        let config = load_str(
            r#"
            [logging]
            level = "debug"
            format = "json"
            directives = ["podchat_events=trace"]

            [listeners]
            initial_capacity = 16
            max_listeners = 128
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.listeners.initial_capacity, 16);
        assert_eq!(config.listeners.max_listeners, Some(128));
    }

    #[test]
    fn test_load_str_empty_uses_defaults() {
        let config = load_str("").unwrap();
        assert_eq!(config, ChatConfig::default());
    }

    #[test]
    fn test_load_str_malformed() {
        let err = load_str("[listeners\ninitial_capacity = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { ref path, .. } if path == "<inline>"));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listeners]\nmax_listeners = 8").unwrap();

        let config = load_file(file.path()).unwrap();
        assert_eq!(config.listeners.max_listeners, Some(8));
        assert_eq!(config.listeners.initial_capacity, 4);
    }

    #[test]
    fn test_load_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_load_optional_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_optional(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, ChatConfig::default());
    }

    #[test]
    fn test_oversized_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let padding = "#".repeat(1_048_577);
        file.write_all(padding.as_bytes()).unwrap();

        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn test_env_override() {
        let mut config = ChatConfig::default();
        apply_env_overrides(&mut config, |key| {
            (key == LOG_LEVEL_ENV).then(|| "podchat_events=trace".to_string())
        })
        .unwrap();
        assert_eq!(config.logging.level, "podchat_events=trace");
    }

    #[test]
    fn test_env_override_invalid() {
        let mut config = ChatConfig::default();
        let result = apply_env_overrides(&mut config, |_| Some("[nope".to_string()));
        assert!(result.is_err());
    }
}
