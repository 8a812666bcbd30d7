//! Prelude module - commonly used types for convenient import.
//!
//! Use `use podchat_events::prelude::*;` to import all essential types.

// Listeners
pub use crate::{CallbackListener, ChatListener};

// Registry
pub use crate::ChatListenerManager;

// Shared types
pub use podchat_core::{DispatchError, EventKind, ListenerError, ListenerResult};
