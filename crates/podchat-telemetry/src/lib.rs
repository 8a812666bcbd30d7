//! Podchat Telemetry - Logging for the Podchat client SDK.
//!
//! This crate provides configurable logging setup with multiple formats and
//! targets on top of `tracing-subscriber`. Library crates only emit
//! `tracing` events; the embedding application calls [`setup_logging`] once.
//!
//! # Example
//!
//! ```rust,no_run
//! use podchat_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), podchat_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("podchat_events=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!("Chat session started");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging,
    setup_logging,
};
