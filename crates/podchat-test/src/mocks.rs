//! Mock listeners for testing.

use std::sync::{Arc, Mutex, PoisonError};

use podchat_core::{EventKind, ListenerError, ListenerResult};
use podchat_events::ChatListener;

/// One observed listener call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEntry {
    /// An event callback was invoked.
    Event {
        /// Listener name.
        listener: String,
        /// Event kind delivered.
        kind: EventKind,
        /// Payload delivered.
        payload: String,
    },
    /// The error-isolation callback was invoked.
    CallbackError {
        /// Listener name.
        listener: String,
        /// Rendered cause.
        cause: String,
    },
}

/// Shared, ordered record of listener calls across many listeners.
#[derive(Debug, Clone, Default)]
pub struct CallJournal {
    entries: Arc<Mutex<Vec<JournalEntry>>>,
}

impl CallJournal {
    /// Create an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, entry: JournalEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    /// All entries in call order.
    #[must_use]
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Names of listeners that received `kind`, in delivery order.
    #[must_use]
    pub fn listeners_for(&self, kind: EventKind) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                JournalEntry::Event {
                    listener, kind: k, ..
                } if k == kind => Some(listener),
                _ => None,
            })
            .collect()
    }

    /// Payloads `listener` received, in delivery order.
    #[must_use]
    pub fn payloads_for(&self, listener: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                JournalEntry::Event {
                    listener: l,
                    payload,
                    ..
                } if l == listener => Some(payload),
                _ => None,
            })
            .collect()
    }

    /// Causes passed to `listener`'s error-isolation callback.
    #[must_use]
    pub fn errors_for(&self, listener: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                JournalEntry::CallbackError { listener: l, cause } if l == listener => Some(cause),
                _ => None,
            })
            .collect()
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How an injected failure manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Return `Err(ListenerError::Callback)`.
    Error,
    /// Panic.
    Panic,
}

impl Failure {
    fn trigger(self, what: &str) -> ListenerResult {
        match self {
            Self::Error => Err(ListenerError::callback(what.to_string())),
            Self::Panic => panic!("{what}"),
        }
    }
}

/// Listener that journals every call and can fail on demand.
#[derive(Debug)]
pub struct RecordingListener {
    name: String,
    journal: CallJournal,
    fail_on: Vec<(EventKind, Failure)>,
    handler_failure: Option<Failure>,
}

impl RecordingListener {
    /// Create a listener that records into `journal` and never fails.
    #[must_use]
    pub fn new(name: impl Into<String>, journal: &CallJournal) -> Arc<dyn ChatListener> {
        Self::builder(name, journal).build()
    }

    /// Start configuring a listener.
    #[must_use]
    pub fn builder(name: impl Into<String>, journal: &CallJournal) -> RecordingListenerBuilder {
        RecordingListenerBuilder {
            inner: Self {
                name: name.into(),
                journal: journal.clone(),
                fail_on: Vec::new(),
                handler_failure: None,
            },
        }
    }

    fn failure_for(&self, kind: EventKind) -> Option<Failure> {
        self.fail_on
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, failure)| *failure)
    }
}

impl ChatListener for RecordingListener {
    fn on_event(&self, kind: EventKind, content: &str) -> ListenerResult {
        self.journal.push(JournalEntry::Event {
            listener: self.name.clone(),
            kind,
            payload: content.to_string(),
        });
        match self.failure_for(kind) {
            Some(failure) => failure.trigger(&format!("{} rejected {kind}", self.name)),
            None => Ok(()),
        }
    }

    fn handle_callback_error(&self, cause: &ListenerError) -> ListenerResult {
        self.journal.push(JournalEntry::CallbackError {
            listener: self.name.clone(),
            cause: cause.to_string(),
        });
        match self.handler_failure {
            Some(failure) => failure.trigger(&format!("{} error handler failed", self.name)),
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Builder for [`RecordingListener`].
#[derive(Debug)]
pub struct RecordingListenerBuilder {
    inner: RecordingListener,
}

impl RecordingListenerBuilder {
    /// Fail whenever `kind` is delivered.
    #[must_use]
    pub fn fail_on(mut self, kind: EventKind, failure: Failure) -> Self {
        self.inner.fail_on.push((kind, failure));
        self
    }

    /// Make the error-isolation callback fail too.
    #[must_use]
    pub fn failing_error_handler(mut self, failure: Failure) -> Self {
        self.inner.handler_failure = Some(failure);
        self
    }

    /// Finish the listener.
    #[must_use]
    pub fn build(self) -> Arc<dyn ChatListener> {
        Arc::new(self.inner)
    }
}
