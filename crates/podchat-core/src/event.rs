//! Event kinds delivered to chat listeners.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownEventKind;

/// Kinds of asynchronous chat events fanned out to listeners.
///
/// Each kind maps to exactly one listener callback. The wire name of a kind
/// (see [`EventKind::as_str`]) is the camel-case name of that callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// A page of threads was fetched.
    GetThread,
    /// A page of thread history was fetched.
    GetHistory,
    /// The contact list was fetched.
    GetContacts,
    /// An invitation was received.
    Invitation,
    /// A message was accepted by the server.
    Sent,
    /// A message was seen by its recipient.
    Seen,
    /// A message was delivered to its recipient.
    Deliver,
    /// The server reported an error.
    Error,
    /// The participant list of a thread was fetched.
    GetThreadParticipant,
    /// A message was edited.
    EditedMessage,
    /// A contact was added.
    ContactAdded,
    /// A contact was removed.
    RemoveContact,
    /// A contact was updated.
    UpdateContact,
    /// A thread was muted.
    MuteThread,
    /// A thread was unmuted.
    UnmuteThread,
    /// User info was received.
    UserInfo,
    /// A thread was created.
    CreateThread,
}

impl EventKind {
    /// Every event kind, in declaration order.
    pub const ALL: [EventKind; 17] = [
        Self::GetThread,
        Self::GetHistory,
        Self::GetContacts,
        Self::Invitation,
        Self::Sent,
        Self::Seen,
        Self::Deliver,
        Self::Error,
        Self::GetThreadParticipant,
        Self::EditedMessage,
        Self::ContactAdded,
        Self::RemoveContact,
        Self::UpdateContact,
        Self::MuteThread,
        Self::UnmuteThread,
        Self::UserInfo,
        Self::CreateThread,
    ];

    /// Wire name of the kind, matching the listener callback it targets.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetThread => "onGetThread",
            Self::GetHistory => "onGetHistory",
            Self::GetContacts => "onGetContacts",
            Self::Invitation => "onInvitation",
            Self::Sent => "onSent",
            Self::Seen => "onSeen",
            Self::Deliver => "onDeliver",
            Self::Error => "onError",
            Self::GetThreadParticipant => "onGetThreadParticipant",
            Self::EditedMessage => "onEditedMessage",
            Self::ContactAdded => "onContactAdded",
            Self::RemoveContact => "onRemoveContact",
            Self::UpdateContact => "onUpdateContact",
            Self::MuteThread => "onMuteThread",
            Self::UnmuteThread => "onUnmuteThread",
            Self::UserInfo => "onUserInfo",
            Self::CreateThread => "onCreateThread",
        }
    }

    /// Whether a listener failure for this kind is isolated.
    ///
    /// Guarded kinds route a failing callback to the listener's own error
    /// handler and keep delivering. Unguarded kinds propagate the first
    /// failure to the emitter and skip the remaining listeners.
    #[must_use]
    pub fn is_guarded(&self) -> bool {
        !matches!(
            self,
            Self::GetThread
                | Self::GetHistory
                | Self::GetContacts
                | Self::Invitation
                | Self::Sent
                | Self::Seen
                | Self::Deliver
                | Self::Error
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}
