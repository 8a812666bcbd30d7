//! Podchat Test - Shared test utilities for the Podchat client SDK.
//!
//! Add as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! podchat-test.workspace = true
//! ```
//!
//! ```rust
//! use std::sync::Arc;
//! use podchat_core::EventKind;
//! use podchat_events::ChatListenerManager;
//! use podchat_test::{CallJournal, RecordingListener};
//!
//! let journal = CallJournal::new();
//! let manager = ChatListenerManager::new();
//! manager.add(RecordingListener::new("a", &journal));
//! manager.add(RecordingListener::new("b", &journal));
//!
//! manager.emit(EventKind::Sent, "msg-123").unwrap();
//! assert_eq!(journal.listeners_for(EventKind::Sent), vec!["a", "b"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod harness;
pub mod mocks;

pub use harness::*;
pub use mocks::*;
