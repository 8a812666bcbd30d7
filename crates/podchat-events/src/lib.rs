//! Podchat Events - Listener fan-out for the Podchat client SDK.
//!
//! This crate provides:
//! - [`ChatListener`], the callback interface applications implement
//! - [`CallbackListener`], a listener assembled from closures
//! - [`ChatListenerManager`], the thread-safe registry that delivers events
//!
//! # Architecture
//!
//! The network layer decodes server responses into opaque payload strings
//! and emits them through a `ChatListenerManager`. The manager copies its
//! membership into a snapshot under a short lock, then invokes each
//! listener's callback for the event kind outside the lock.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use podchat_core::EventKind;
//! use podchat_events::{CallbackListener, ChatListenerManager};
//!
//! let manager = ChatListenerManager::new();
//! manager.add(Arc::new(
//!     CallbackListener::new("ui").on(EventKind::Sent, |content| {
//!         assert_eq!(content, "msg-123");
//!         Ok(())
//!     }),
//! ));
//!
//! let delivered = manager.emit(EventKind::Sent, "msg-123").unwrap();
//! assert_eq!(delivered, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod listener;
mod manager;

pub use listener::{CallbackListener, ChatListener, ErrorCallback, EventCallback};
pub use manager::ChatListenerManager;
