//! Configuration types.

use serde::{Deserialize, Serialize};

use podchat_telemetry::LogConfig;

/// Top-level chat SDK configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Logging setup applied by the embedding application.
    pub logging: LogConfig,
    /// Listener registry settings.
    pub listeners: ListenersSection,
}

// ---------------------------------------------------------------------------
// ListenersSection
// ---------------------------------------------------------------------------

/// Listener registry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenersSection {
    /// Listener slots reserved up front.
    pub initial_capacity: usize,
    /// Registration count above which a warning is logged. `None` disables
    /// the check.
    pub max_listeners: Option<usize>,
}

impl Default for ListenersSection {
    fn default() -> Self {
        Self {
            initial_capacity: 4,
            max_listeners: Some(64),
        }
    }
}
