//! Common response envelope carried by event payloads.
//!
//! Payloads reach the listener registry as opaque strings. Listeners that
//! want the typed body decode them with [`ChatOutput::parse`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ListenerError, ListenerResult};

/// Response envelope shared by every chat output.
///
/// The envelope fields use the server's camel-case names. The typed body is
/// flattened into the same JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatOutput<T = serde_json::Value> {
    /// Whether the server reported an error.
    #[serde(default)]
    pub has_error: bool,
    /// Error description, when `has_error` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Server error code, `0` when absent.
    #[serde(default)]
    pub error_code: i64,
    /// Client-generated id correlating the output with its request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    /// Whether the output was served from the local cache.
    #[serde(default)]
    pub cache: bool,
    /// Typed body.
    #[serde(flatten)]
    pub result: Option<T>,
}

impl<T> ChatOutput<T> {
    /// Wrap a successful body.
    pub fn success(result: T) -> Self {
        Self {
            has_error: false,
            error_message: None,
            error_code: 0,
            unique_id: None,
            cache: false,
            result: Some(result),
        }
    }

    /// Set the correlation id.
    #[must_use]
    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    /// Mark the output as served from cache.
    #[must_use]
    pub fn from_cache(mut self) -> Self {
        self.cache = true;
        self
    }

    /// Consume the envelope, returning the body or the reported error.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Callback`] if the server flagged an error or
    /// the body is missing.
    pub fn into_result(self) -> ListenerResult<T> {
        if self.has_error {
            let message = self.error_message.unwrap_or_default();
            return Err(ListenerError::Callback(format!(
                "server error {}: {message}",
                self.error_code
            )));
        }
        self.result
            .ok_or_else(|| ListenerError::callback("output has no result body"))
    }
}

impl ChatOutput<serde_json::Value> {
    /// Build an error envelope with no body.
    pub fn error(code: i64, message: impl Into<String>) -> Self {
        Self {
            has_error: true,
            error_message: Some(message.into()),
            error_code: code,
            unique_id: None,
            cache: false,
            result: None,
        }
    }
}

impl<T: DeserializeOwned> ChatOutput<T> {
    /// Decode a serialized payload.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Payload`] if the payload is not a valid
    /// envelope for `T`.
    pub fn parse(payload: &str) -> ListenerResult<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}

impl<T: Serialize> ChatOutput<T> {
    /// Serialize the envelope into an event payload.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Payload`] if the body cannot be serialized.
    pub fn to_payload(&self) -> ListenerResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
