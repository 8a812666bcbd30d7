//! Listener registry fanning chat events out to every registered listener.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace, warn};

use podchat_core::{DispatchError, EventKind, ListenerError};

use crate::listener::ChatListener;

/// Immutable point-in-time copy of the registered listeners.
type Snapshot = Arc<[Arc<dyn ChatListener>]>;

/// Membership state guarded by the registry lock.
struct Members {
    listeners: Vec<Arc<dyn ChatListener>>,
    /// Last built copy of `listeners`. Replaced, never mutated.
    snapshot: Snapshot,
    /// Set whenever `listeners` changed since `snapshot` was built.
    dirty: bool,
    rebuilds: u64,
}

impl Members {
    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn position_of(&self, listener: &Arc<dyn ChatListener>) -> Option<usize> {
        self.listeners.iter().position(|l| Arc::ptr_eq(l, listener))
    }
}

/// Registry delivering chat events to a dynamic set of listeners.
///
/// Listeners are kept in registration order and identified by `Arc`
/// identity. Registering the same listener twice delivers every event to it
/// twice.
///
/// Delivery iterates a snapshot of the membership taken under the registry
/// lock; the lock is released before any callback runs. A listener may
/// therefore add or remove listeners (itself included) from inside a
/// callback. Such changes apply from the next emit onward.
///
/// # Failure isolation
///
/// For guarded kinds (see [`EventKind::is_guarded`]) a failing or panicking
/// callback is handed to that listener's
/// [`handle_callback_error`](ChatListener::handle_callback_error) and
/// delivery continues. For unguarded kinds the first failure aborts delivery
/// and is returned to the emitter as a [`DispatchError`].
pub struct ChatListenerManager {
    members: Mutex<Members>,
    /// Membership size above which registration logs a warning.
    soft_limit: Option<usize>,
}

impl std::fmt::Debug for ChatListenerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let members = self.lock();
        f.debug_struct("ChatListenerManager")
            .field("listener_count", &members.listeners.len())
            .field("dirty", &members.dirty)
            .field("snapshot_rebuilds", &members.rebuilds)
            .field("soft_limit", &self.soft_limit)
            .finish()
    }
}

impl Default for ChatListenerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatListenerManager {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty registry with room for `capacity` listeners.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: Mutex::new(Members {
                listeners: Vec::with_capacity(capacity),
                snapshot: Arc::from(Vec::new()),
                dirty: false,
                rebuilds: 0,
            }),
            soft_limit: None,
        }
    }

    /// Warn when registration grows the membership beyond `limit`.
    ///
    /// The limit is advisory; registration never fails.
    #[must_use]
    pub fn with_soft_limit(mut self, limit: usize) -> Self {
        self.soft_limit = Some(limit);
        self
    }

    /// Create a registry from the `[listeners]` config section.
    #[cfg(feature = "config")]
    #[must_use]
    pub fn from_config(config: &podchat_config::ListenersSection) -> Self {
        let manager = Self::with_capacity(config.initial_capacity);
        match config.max_listeners {
            Some(limit) => manager.with_soft_limit(limit),
            None => manager,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Members> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_soft_limit(&self, len: usize) {
        if let Some(limit) = self.soft_limit
            && len > limit
        {
            warn!(
                listener_count = len,
                soft_limit = limit,
                "Listener count exceeds soft limit, listeners may be leaking"
            );
        }
    }

    /// Register a listener at the end of the delivery order.
    pub fn add(&self, listener: Arc<dyn ChatListener>) {
        let name = listener.name().to_string();
        let len = {
            let mut members = self.lock();
            members.listeners.push(listener);
            members.mark_dirty();
            members.listeners.len()
        };

        debug!(listener_name = %name, listener_count = len, "Listener registered");
        self.check_soft_limit(len);
    }

    /// Register every listener in `listeners`, preserving their order.
    ///
    /// Returns the number of listeners added.
    pub fn add_all<I>(&self, listeners: I) -> usize
    where
        I: IntoIterator<Item = Arc<dyn ChatListener>>,
    {
        // Drain the caller's iterator before locking.
        let incoming: Vec<_> = listeners.into_iter().collect();
        if incoming.is_empty() {
            return 0;
        }

        let added = incoming.len();
        let len = {
            let mut members = self.lock();
            members.listeners.extend(incoming);
            members.mark_dirty();
            members.listeners.len()
        };

        debug!(added, listener_count = len, "Listeners registered");
        self.check_soft_limit(len);
        added
    }

    /// Unregister the first registration of `listener`.
    ///
    /// Returns `true` if the listener was found and removed.
    pub fn remove(&self, listener: &Arc<dyn ChatListener>) -> bool {
        let removed = {
            let mut members = self.lock();
            match members.position_of(listener) {
                Some(index) => {
                    // Dropped after the lock is released, so a listener's
                    // `Drop` may call back into the registry.
                    let entry = members.listeners.remove(index);
                    members.mark_dirty();
                    Some(entry)
                },
                None => None,
            }
        };

        match removed {
            Some(entry) => {
                debug!(listener_name = %entry.name(), "Listener unregistered");
                true
            },
            None => false,
        }
    }

    /// Unregister the first registration of each listener in `listeners`.
    ///
    /// Returns the number of listeners removed.
    pub fn remove_all<'a, I>(&self, listeners: I) -> usize
    where
        I: IntoIterator<Item = &'a Arc<dyn ChatListener>>,
    {
        let targets: Vec<_> = listeners.into_iter().collect();
        let removed: Vec<Arc<dyn ChatListener>> = {
            let mut members = self.lock();
            let mut removed = Vec::new();
            for listener in targets {
                if let Some(index) = members.position_of(listener) {
                    removed.push(members.listeners.remove(index));
                }
            }
            if !removed.is_empty() {
                members.mark_dirty();
            }
            removed
        };

        if !removed.is_empty() {
            debug!(removed = removed.len(), "Listeners unregistered");
        }
        removed.len()
    }

    /// Unregister every listener.
    pub fn clear(&self) {
        let cleared = {
            let mut members = self.lock();
            if members.listeners.is_empty() {
                return;
            }
            members.mark_dirty();
            std::mem::take(&mut members.listeners)
        };

        debug!(cleared = cleared.len(), "All listeners cleared");
    }

    /// Number of registrations, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().listeners.is_empty()
    }

    /// Number of times the delivery snapshot has been rebuilt.
    #[must_use]
    pub fn snapshot_rebuilds(&self) -> u64 {
        self.lock().rebuilds
    }

    /// Resolve the delivery snapshot, rebuilding it if membership changed.
    fn snapshot(&self) -> Snapshot {
        let mut members = self.lock();
        if !members.dirty {
            return Arc::clone(&members.snapshot);
        }

        let fresh: Snapshot = Arc::from(members.listeners.as_slice());
        let stale = std::mem::replace(&mut members.snapshot, Arc::clone(&fresh));
        members.dirty = false;
        members.rebuilds = members.rebuilds.saturating_add(1);
        drop(members);

        trace!(listener_count = fresh.len(), "Listener snapshot rebuilt");
        // May hold the last reference to a removed listener; its `Drop` can
        // re-enter the registry now that the lock is released.
        drop(stale);
        fresh
    }

    /// Deliver an event to every registered listener.
    ///
    /// `payload` is passed through untouched. Returns the number of listeners
    /// in the snapshot used for delivery.
    ///
    /// # Errors
    ///
    /// For unguarded kinds, returns the first listener failure; listeners
    /// after the failing one do not receive the event. Guarded kinds never
    /// return an error.
    pub fn emit(&self, kind: EventKind, payload: &str) -> Result<usize, DispatchError> {
        if kind.is_guarded() {
            Ok(self.emit_guarded(kind, payload))
        } else {
            self.emit_unguarded(kind, payload)
        }
    }

    fn emit_unguarded(&self, kind: EventKind, payload: &str) -> Result<usize, DispatchError> {
        let snapshot = self.snapshot();
        trace!(event_kind = %kind, listener_count = snapshot.len(), "Emitting event");

        for (position, listener) in snapshot.iter().enumerate() {
            listener.on_event(kind, payload).map_err(|source| {
                debug!(
                    listener_name = %listener.name(),
                    event_kind = %kind,
                    position,
                    error = %source,
                    "Listener failed, aborting delivery"
                );
                DispatchError {
                    kind,
                    listener: listener.name().to_string(),
                    position,
                    source,
                }
            })?;
        }

        Ok(snapshot.len())
    }

    fn emit_guarded(&self, kind: EventKind, payload: &str) -> usize {
        let snapshot = self.snapshot();
        trace!(event_kind = %kind, listener_count = snapshot.len(), "Emitting guarded event");

        for listener in snapshot.iter() {
            deliver_guarded(listener.as_ref(), kind, payload);
        }

        snapshot.len()
    }

    /// Deliver [`EventKind::GetThread`].
    ///
    /// # Errors
    ///
    /// Returns the first listener failure.
    pub fn emit_get_thread(&self, payload: &str) -> Result<usize, DispatchError> {
        self.emit_unguarded(EventKind::GetThread, payload)
    }

    /// Deliver [`EventKind::GetHistory`].
    ///
    /// # Errors
    ///
    /// Returns the first listener failure.
    pub fn emit_get_history(&self, payload: &str) -> Result<usize, DispatchError> {
        self.emit_unguarded(EventKind::GetHistory, payload)
    }

    /// Deliver [`EventKind::GetContacts`].
    ///
    /// # Errors
    ///
    /// Returns the first listener failure.
    pub fn emit_get_contacts(&self, payload: &str) -> Result<usize, DispatchError> {
        self.emit_unguarded(EventKind::GetContacts, payload)
    }

    /// Deliver [`EventKind::Invitation`].
    ///
    /// # Errors
    ///
    /// Returns the first listener failure.
    pub fn emit_invitation(&self, payload: &str) -> Result<usize, DispatchError> {
        self.emit_unguarded(EventKind::Invitation, payload)
    }

    /// Deliver [`EventKind::Sent`].
    ///
    /// # Errors
    ///
    /// Returns the first listener failure.
    pub fn emit_sent(&self, payload: &str) -> Result<usize, DispatchError> {
        self.emit_unguarded(EventKind::Sent, payload)
    }

    /// Deliver [`EventKind::Seen`].
    ///
    /// # Errors
    ///
    /// Returns the first listener failure.
    pub fn emit_seen(&self, payload: &str) -> Result<usize, DispatchError> {
        self.emit_unguarded(EventKind::Seen, payload)
    }

    /// Deliver [`EventKind::Deliver`].
    ///
    /// # Errors
    ///
    /// Returns the first listener failure.
    pub fn emit_deliver(&self, payload: &str) -> Result<usize, DispatchError> {
        self.emit_unguarded(EventKind::Deliver, payload)
    }

    /// Deliver [`EventKind::Error`].
    ///
    /// # Errors
    ///
    /// Returns the first listener failure.
    pub fn emit_error(&self, payload: &str) -> Result<usize, DispatchError> {
        self.emit_unguarded(EventKind::Error, payload)
    }

    /// Deliver [`EventKind::GetThreadParticipant`].
    pub fn emit_get_thread_participant(&self, payload: &str) -> usize {
        self.emit_guarded(EventKind::GetThreadParticipant, payload)
    }

    /// Deliver [`EventKind::EditedMessage`].
    pub fn emit_edited_message(&self, payload: &str) -> usize {
        self.emit_guarded(EventKind::EditedMessage, payload)
    }

    /// Deliver [`EventKind::ContactAdded`].
    pub fn emit_contact_added(&self, payload: &str) -> usize {
        self.emit_guarded(EventKind::ContactAdded, payload)
    }

    /// Deliver [`EventKind::RemoveContact`].
    pub fn emit_remove_contact(&self, payload: &str) -> usize {
        self.emit_guarded(EventKind::RemoveContact, payload)
    }

    /// Deliver [`EventKind::UpdateContact`].
    pub fn emit_update_contact(&self, payload: &str) -> usize {
        self.emit_guarded(EventKind::UpdateContact, payload)
    }

    /// Deliver [`EventKind::MuteThread`].
    pub fn emit_mute_thread(&self, payload: &str) -> usize {
        self.emit_guarded(EventKind::MuteThread, payload)
    }

    /// Deliver [`EventKind::UnmuteThread`].
    pub fn emit_unmute_thread(&self, payload: &str) -> usize {
        self.emit_guarded(EventKind::UnmuteThread, payload)
    }

    /// Deliver [`EventKind::UserInfo`].
    pub fn emit_user_info(&self, payload: &str) -> usize {
        self.emit_guarded(EventKind::UserInfo, payload)
    }

    /// Deliver [`EventKind::CreateThread`].
    pub fn emit_create_thread(&self, payload: &str) -> usize {
        self.emit_guarded(EventKind::CreateThread, payload)
    }
}

/// Invoke one listener, routing any failure to its own error handler.
fn deliver_guarded(listener: &dyn ChatListener, kind: EventKind, payload: &str) {
    trace!(listener_name = %listener.name(), event_kind = %kind, "Notifying listener");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(kind, payload)));
    let cause = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(e)) => e,
        Err(panic_payload) => ListenerError::from_panic(panic_payload.as_ref()),
    };

    warn!(
        listener_name = %listener.name(),
        event_kind = %kind,
        error = %cause,
        "Listener callback failed"
    );

    let handled = panic::catch_unwind(AssertUnwindSafe(|| listener.handle_callback_error(&cause)));
    match handled {
        Ok(Ok(())) => {},
        Ok(Err(e)) => {
            debug!(listener_name = %listener.name(), error = %e, "Listener error handler failed");
        },
        Err(panic_payload) => {
            let e = ListenerError::from_panic(panic_payload.as_ref());
            debug!(listener_name = %listener.name(), error = %e, "Listener error handler panicked");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podchat_core::{ListenerError, ListenerResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingListener {
        name: String,
        count: AtomicUsize,
    }

    impl CountingListener {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                count: AtomicUsize::new(0),
            })
        }

        fn count(&self) -> usize {
            self.count.load(Ordering::SeqCst)
        }
    }

    impl ChatListener for CountingListener {
        fn on_event(&self, _kind: EventKind, _content: &str) -> ListenerResult {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    struct FailingListener;

    impl ChatListener for FailingListener {
        fn on_event(&self, _kind: EventKind, _content: &str) -> ListenerResult {
            Err(ListenerError::callback("nope"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn as_dyn(listener: &Arc<CountingListener>) -> Arc<dyn ChatListener> {
        Arc::clone(listener) as Arc<dyn ChatListener>
    }

    #[test]
    fn test_add_and_emit() {
        let manager = ChatListenerManager::new();
        assert!(manager.is_empty());

        let listener = CountingListener::new("a");
        manager.add(as_dyn(&listener));
        assert_eq!(manager.len(), 1);

        let delivered = manager.emit(EventKind::Sent, "msg-1").unwrap();
        assert_eq!(delivered, 1);
        assert_eq!(listener.count(), 1);
    }

    #[test]
    fn test_emit_without_listeners() {
        let manager = ChatListenerManager::new();
        assert_eq!(manager.emit(EventKind::Error, "{}").unwrap(), 0);
        assert_eq!(manager.emit_user_info("{}"), 0);
        assert_eq!(manager.snapshot_rebuilds(), 0);
    }

    #[test]
    fn test_duplicate_registration_delivers_twice() {
        let manager = ChatListenerManager::new();
        let listener = CountingListener::new("dup");
        manager.add(as_dyn(&listener));
        manager.add(as_dyn(&listener));

        manager.emit_seen("m").unwrap();
        assert_eq!(listener.count(), 2);

        // One removal drops one registration.
        assert!(manager.remove(&as_dyn(&listener)));
        manager.emit_seen("m").unwrap();
        assert_eq!(listener.count(), 3);
    }

    #[test]
    fn test_remove_absent_does_not_rebuild() {
        let manager = ChatListenerManager::new();
        let present = CountingListener::new("present");
        let absent = CountingListener::new("absent");
        manager.add(as_dyn(&present));

        manager.emit_deliver("m").unwrap();
        assert_eq!(manager.snapshot_rebuilds(), 1);

        assert!(!manager.remove(&as_dyn(&absent)));
        assert_eq!(manager.remove_all([&as_dyn(&absent)]), 0);
        manager.emit_deliver("m").unwrap();
        assert_eq!(manager.snapshot_rebuilds(), 1);
    }

    #[test]
    fn test_snapshot_reused_until_mutation() {
        let manager = ChatListenerManager::new();
        manager.add(as_dyn(&CountingListener::new("a")));

        manager.emit_sent("1").unwrap();
        manager.emit_sent("2").unwrap();
        manager.emit_contact_added("3");
        assert_eq!(manager.snapshot_rebuilds(), 1);

        manager.add(as_dyn(&CountingListener::new("b")));
        manager.emit_sent("4").unwrap();
        assert_eq!(manager.snapshot_rebuilds(), 2);
    }

    #[test]
    fn test_clear_empty_does_not_rebuild() {
        let manager = ChatListenerManager::new();
        manager.clear();
        assert_eq!(manager.add_all(Vec::<Arc<dyn ChatListener>>::new()), 0);
        manager.emit_sent("x").unwrap();
        assert_eq!(manager.snapshot_rebuilds(), 0);

        let listener = CountingListener::new("a");
        manager.add(as_dyn(&listener));
        manager.clear();
        assert!(manager.is_empty());
        manager.emit_sent("x").unwrap();
        assert_eq!(listener.count(), 0);
        assert_eq!(manager.snapshot_rebuilds(), 1);
    }

    #[test]
    fn test_add_all_and_remove_all() {
        let manager = ChatListenerManager::new();
        let a = CountingListener::new("a");
        let b = CountingListener::new("b");
        let c = CountingListener::new("c");

        let added = manager.add_all([as_dyn(&a), as_dyn(&b), as_dyn(&c)]);
        assert_eq!(added, 3);
        assert_eq!(manager.len(), 3);

        let removed = manager.remove_all([&as_dyn(&a), &as_dyn(&c)]);
        assert_eq!(removed, 2);

        manager.emit_mute_thread("t");
        assert_eq!(a.count(), 0);
        assert_eq!(b.count(), 1);
        assert_eq!(c.count(), 0);
    }

    #[test]
    fn test_unguarded_failure_propagates() {
        let manager = ChatListenerManager::new();
        let after = CountingListener::new("after");
        manager.add(Arc::new(FailingListener));
        manager.add(as_dyn(&after));

        let err = manager.emit(EventKind::GetThread, "{}").unwrap_err();
        assert_eq!(err.kind, EventKind::GetThread);
        assert_eq!(err.listener, "failing");
        assert_eq!(err.position, 0);
        assert_eq!(after.count(), 0);
    }

    #[test]
    fn test_guarded_failure_continues() {
        let manager = ChatListenerManager::new();
        let after = CountingListener::new("after");
        manager.add(Arc::new(FailingListener));
        manager.add(as_dyn(&after));

        let delivered = manager.emit(EventKind::EditedMessage, "{}").unwrap();
        assert_eq!(delivered, 2);
        assert_eq!(after.count(), 1);
    }

    #[test]
    fn test_guarded_panic_is_contained() {
        struct Panicking;
        impl ChatListener for Panicking {
            fn on_create_thread(&self, _content: &str) -> ListenerResult {
                panic!("listener bug");
            }
        }

        let manager = ChatListenerManager::new();
        let after = CountingListener::new("after");
        manager.add(Arc::new(Panicking));
        manager.add(as_dyn(&after));

        assert_eq!(manager.emit_create_thread("{}"), 2);
        assert_eq!(after.count(), 1);
    }

    #[test]
    fn test_soft_limit_does_not_reject() {
        let manager = ChatListenerManager::with_capacity(1).with_soft_limit(1);
        manager.add(as_dyn(&CountingListener::new("a")));
        manager.add(as_dyn(&CountingListener::new("b")));
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_debug_output() {
        let manager = ChatListenerManager::new();
        manager.add(as_dyn(&CountingListener::new("a")));
        let debug = format!("{manager:?}");
        assert!(debug.contains("listener_count: 1"));
        assert!(debug.contains("dirty: true"));
    }
}
