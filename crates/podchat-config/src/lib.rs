//! Podchat Config - Configuration for the Podchat client SDK.
//!
//! A single TOML file configures logging and the listener registry:
//!
//! ```toml
//! [logging]
//! level = "info"
//! format = "compact"
//!
//! [listeners]
//! initial_capacity = 4
//! max_listeners = 64
//! ```
//!
//! Missing sections and fields take their defaults.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod loader;
mod types;
mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{LOG_LEVEL_ENV, apply_env_overrides, load_file, load_optional, load_str};
pub use types::{ChatConfig, ListenersSection};
pub use validate::validate;

impl ChatConfig {
    /// Load configuration from a file; see [`load_file`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be loaded.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }

    /// Load configuration from a file if present, applying the
    /// [`LOG_LEVEL_ENV`] override from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file exists but cannot be loaded or
    /// the override is invalid.
    pub fn load_with_env(path: &std::path::Path) -> ConfigResult<Self> {
        let mut config = loader::load_optional(path)?;
        loader::apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        Ok(config)
    }
}
