//! Chat listener trait and a closure-based implementation.

use std::collections::HashMap;
use std::fmt;

use podchat_core::{EventKind, ListenerError, ListenerResult};

/// Receiver of chat events.
///
/// Every callback defaults to a no-op, so implementations only override the
/// events they care about. Callbacks run on the emitting thread and should
/// return quickly.
///
/// Payloads are opaque serialized outputs; decode them with
/// [`ChatOutput::parse`](podchat_core::ChatOutput::parse) if needed.
pub trait ChatListener: Send + Sync {
    /// Threads were fetched.
    fn on_get_thread(&self, _content: &str) -> ListenerResult {
        Ok(())
    }

    /// Thread history was fetched.
    fn on_get_history(&self, _content: &str) -> ListenerResult {
        Ok(())
    }

    /// Contacts were fetched.
    fn on_get_contacts(&self, _content: &str) -> ListenerResult {
        Ok(())
    }

    /// An invitation was received.
    fn on_invitation(&self, _content: &str) -> ListenerResult {
        Ok(())
    }

    /// A message was sent.
    fn on_sent(&self, _content: &str) -> ListenerResult {
        Ok(())
    }

    /// A message was seen.
    fn on_seen(&self, _content: &str) -> ListenerResult {
        Ok(())
    }

    /// A message was delivered.
    fn on_deliver(&self, _content: &str) -> ListenerResult {
        Ok(())
    }

    /// The server reported an error.
    fn on_error(&self, _content: &str) -> ListenerResult {
        Ok(())
    }

    /// Thread participants were fetched.
    fn on_get_thread_participant(&self, _content: &str) -> ListenerResult {
        Ok(())
    }

    /// A message was edited.
    fn on_edited_message(&self, _content: &str) -> ListenerResult {
        Ok(())
    }

    /// A contact was added.
    fn on_contact_added(&self, _content: &str) -> ListenerResult {
        Ok(())
    }

    /// A contact was removed.
    fn on_remove_contact(&self, _content: &str) -> ListenerResult {
        Ok(())
    }

    /// A contact was updated.
    fn on_update_contact(&self, _content: &str) -> ListenerResult {
        Ok(())
    }

    /// A thread was muted.
    fn on_mute_thread(&self, _content: &str) -> ListenerResult {
        Ok(())
    }

    /// A thread was unmuted.
    fn on_unmute_thread(&self, _content: &str) -> ListenerResult {
        Ok(())
    }

    /// User info was received.
    fn on_user_info(&self, _content: &str) -> ListenerResult {
        Ok(())
    }

    /// A thread was created.
    fn on_create_thread(&self, _content: &str) -> ListenerResult {
        Ok(())
    }

    /// Called with the failure of one of this listener's guarded callbacks.
    ///
    /// A failure returned from here is discarded.
    fn handle_callback_error(&self, _cause: &ListenerError) -> ListenerResult {
        Ok(())
    }

    /// Optional name for debugging.
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "anonymous"
    }

    /// Route an event to the callback for its kind.
    fn on_event(&self, kind: EventKind, content: &str) -> ListenerResult {
        match kind {
            EventKind::GetThread => self.on_get_thread(content),
            EventKind::GetHistory => self.on_get_history(content),
            EventKind::GetContacts => self.on_get_contacts(content),
            EventKind::Invitation => self.on_invitation(content),
            EventKind::Sent => self.on_sent(content),
            EventKind::Seen => self.on_seen(content),
            EventKind::Deliver => self.on_deliver(content),
            EventKind::Error => self.on_error(content),
            EventKind::GetThreadParticipant => self.on_get_thread_participant(content),
            EventKind::EditedMessage => self.on_edited_message(content),
            EventKind::ContactAdded => self.on_contact_added(content),
            EventKind::RemoveContact => self.on_remove_contact(content),
            EventKind::UpdateContact => self.on_update_contact(content),
            EventKind::MuteThread => self.on_mute_thread(content),
            EventKind::UnmuteThread => self.on_unmute_thread(content),
            EventKind::UserInfo => self.on_user_info(content),
            EventKind::CreateThread => self.on_create_thread(content),
        }
    }
}

/// Callback slot for a single event kind.
pub type EventCallback = Box<dyn Fn(&str) -> ListenerResult + Send + Sync>;

/// Callback slot for guarded failures.
pub type ErrorCallback = Box<dyn Fn(&ListenerError) -> ListenerResult + Send + Sync>;

/// A listener assembled from closures, one slot per event kind.
///
/// Kinds without a slot are ignored.
pub struct CallbackListener {
    name: String,
    slots: HashMap<EventKind, EventCallback>,
    error_handler: Option<ErrorCallback>,
}

impl CallbackListener {
    /// Create a listener with no slots filled.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: HashMap::new(),
            error_handler: None,
        }
    }

    /// Fill the slot for `kind`, replacing any previous callback.
    #[must_use]
    pub fn on<F>(mut self, kind: EventKind, callback: F) -> Self
    where
        F: Fn(&str) -> ListenerResult + Send + Sync + 'static,
    {
        self.slots.insert(kind, Box::new(callback));
        self
    }

    /// Set the handler for guarded callback failures.
    #[must_use]
    pub fn on_callback_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ListenerError) -> ListenerResult + Send + Sync + 'static,
    {
        self.error_handler = Some(Box::new(handler));
        self
    }

    /// Whether a callback is registered for `kind`.
    #[must_use]
    pub fn handles(&self, kind: EventKind) -> bool {
        self.slots.contains_key(&kind)
    }
}

impl fmt::Debug for CallbackListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.slots.keys().map(EventKind::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("CallbackListener")
            .field("name", &self.name)
            .field("kinds", &kinds)
            .field("has_error_handler", &self.error_handler.is_some())
            .finish()
    }
}

impl ChatListener for CallbackListener {
    fn on_event(&self, kind: EventKind, content: &str) -> ListenerResult {
        match self.slots.get(&kind) {
            Some(callback) => callback(content),
            None => Ok(()),
        }
    }

    fn handle_callback_error(&self, cause: &ListenerError) -> ListenerResult {
        match &self.error_handler {
            Some(handler) => handler(cause),
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct SentOnly {
        seen: Mutex<Vec<String>>,
    }

    impl ChatListener for SentOnly {
        fn on_sent(&self, content: &str) -> ListenerResult {
            self.seen.lock().unwrap().push(content.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_on_event_routes_to_named_callback() {
        let listener = SentOnly::default();
        listener.on_event(EventKind::Sent, "m-1").unwrap();
        listener.on_event(EventKind::Seen, "m-2").unwrap();
        assert_eq!(*listener.seen.lock().unwrap(), vec!["m-1".to_string()]);
        assert_eq!(listener.name(), "anonymous");
    }

    #[test]
    fn test_defaults_are_noops() {
        let listener = SentOnly::default();
        for kind in EventKind::ALL {
            assert!(listener.on_event(kind, "{}").is_ok());
        }
        assert!(
            listener
                .handle_callback_error(&ListenerError::callback("x"))
                .is_ok()
        );
    }

    #[test]
    fn test_callback_listener_slots() {
        let listener = CallbackListener::new("slots")
            .on(EventKind::MuteThread, |_| Ok(()))
            .on(EventKind::UserInfo, |content| {
                Err(ListenerError::callback(format!("bad user {content}")))
            });

        assert!(listener.handles(EventKind::MuteThread));
        assert!(!listener.handles(EventKind::Sent));
        assert!(listener.on_event(EventKind::Sent, "ignored").is_ok());
        assert!(listener.on_event(EventKind::MuteThread, "t-1").is_ok());

        let err = listener.on_event(EventKind::UserInfo, "u-9").unwrap_err();
        assert_eq!(err.to_string(), "callback failed: bad user u-9");
        assert_eq!(listener.name(), "slots");
    }

    #[test]
    fn test_callback_listener_error_handler() {
        let listener = CallbackListener::new("errors")
            .on_callback_error(|cause| Err(ListenerError::callback(format!("again: {cause}"))));
        let err = listener
            .handle_callback_error(&ListenerError::callback("first"))
            .unwrap_err();
        assert_eq!(err.to_string(), "callback failed: again: callback failed: first");
    }

    #[test]
    fn test_callback_listener_debug() {
        let listener = CallbackListener::new("dbg")
            .on(EventKind::Sent, |_| Ok(()))
            .on(EventKind::Seen, |_| Ok(()));
        let debug = format!("{listener:?}");
        assert!(debug.contains("\"onSeen\""));
        assert!(debug.contains("\"onSent\""));
        assert!(debug.contains("has_error_handler: false"));
    }
}
