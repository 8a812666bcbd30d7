//! Error types for listener callbacks and event dispatch.

use thiserror::Error;

use crate::event::EventKind;

/// Failure raised by a listener callback.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The callback reported a failure.
    #[error("callback failed: {0}")]
    Callback(String),

    /// The callback panicked.
    #[error("callback panicked: {0}")]
    Panicked(String),

    /// The callback could not decode its payload.
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl ListenerError {
    /// Create a callback failure from any displayable reason.
    pub fn callback(reason: impl Into<String>) -> Self {
        Self::Callback(reason.into())
    }

    /// Build a [`ListenerError::Panicked`] from a `catch_unwind` payload.
    #[must_use]
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked(message)
    }
}

/// Result type for listener callbacks.
pub type ListenerResult<T = ()> = Result<T, ListenerError>;

/// An unguarded event kind aborted delivery because a listener failed.
#[derive(Debug, Error)]
#[error("listener '{listener}' at position {position} failed on {kind}: {source}")]
pub struct DispatchError {
    /// Event kind being delivered.
    pub kind: EventKind,
    /// Name of the failing listener.
    pub listener: String,
    /// Position of the failing listener within the delivery snapshot.
    pub position: usize,
    /// The listener's failure.
    #[source]
    pub source: ListenerError,
}

/// An event kind wire name did not match any known kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event kind: {0}")]
pub struct UnknownEventKind(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_panic_str() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        let err = ListenerError::from_panic(payload.as_ref());
        assert!(matches!(err, ListenerError::Panicked(ref m) if m == "boom"));
    }

    #[test]
    fn test_from_panic_string() {
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bad state"));
        let err = ListenerError::from_panic(payload.as_ref());
        assert_eq!(err.to_string(), "callback panicked: bad state");
    }

    #[test]
    fn test_from_panic_opaque() {
        let payload: Box<dyn std::any::Any + Send> = Box::new(42_u32);
        let err = ListenerError::from_panic(payload.as_ref());
        assert_eq!(err.to_string(), "callback panicked: non-string panic payload");
    }

    #[test]
    fn test_dispatch_error_display() {
        let err = DispatchError {
            kind: EventKind::Sent,
            listener: "ui".to_string(),
            position: 1,
            source: ListenerError::callback("view detached"),
        };
        assert_eq!(
            err.to_string(),
            "listener 'ui' at position 1 failed on onSent: callback failed: view detached"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
