//! Podchat Core - Shared types for the Podchat client SDK.
//!
//! This crate provides:
//! - [`EventKind`], the closed set of chat events delivered to listeners
//! - Listener and dispatch error types
//! - [`ChatOutput`], the response envelope carried by event payloads
//!
//! # Example
//!
//! ```rust
//! use podchat_core::{ChatOutput, EventKind};
//!
//! let kind: EventKind = "onSent".parse().unwrap();
//! assert!(!kind.is_guarded());
//!
//! let payload = ChatOutput::error(21, "token expired").to_payload().unwrap();
//! assert!(payload.contains("\"hasError\":true"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod event;
mod output;

pub use error::{DispatchError, ListenerError, ListenerResult, UnknownEventKind};
pub use event::EventKind;
pub use output::ChatOutput;
