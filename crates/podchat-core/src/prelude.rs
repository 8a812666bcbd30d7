//! Prelude module - commonly used types for convenient import.
//!
//! Use `use podchat_core::prelude::*;` to import all essential types.

// Events
pub use crate::EventKind;

// Errors
pub use crate::{DispatchError, ListenerError, ListenerResult, UnknownEventKind};

// Payloads
pub use crate::ChatOutput;
