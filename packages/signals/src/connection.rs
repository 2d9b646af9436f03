//! Connection handles that keep a callback connected to an event.

use std::fmt::{self, Display};
use std::sync::{Once, Weak};
use std::time::Instant;

use crate::EventBase;

/// Identifies one callback registration on one event.
///
/// Identifiers are allocated in ascending order by each event and are never reused by that
/// event, even after the registration has been removed. Identifiers from different events are
/// unrelated to each other.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub(crate) const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw numeric value of the identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Keeps a callback connected to an [`Event`][crate::Event].
///
/// Returned by [`Event::connect()`][crate::Event::connect]. The callback stays connected for as
/// long as the `Connection` exists; dropping it disconnects the callback, with the same effect
/// as calling [`Event::disconnect()`][crate::Event::disconnect] with its id.
///
/// A connection only holds a weak reference to its event. Revoking or dropping it after the
/// event itself has been dropped is harmless.
///
/// Connections cannot be cloned - there is exactly one handle per registration.
///
/// # Example
///
/// ```rust
/// use signals::Event;
///
/// let event = Event::<u32>::new();
/// let connection = event.connect(|value| println!("got {value}"));
/// assert!(connection.id().is_some());
///
/// connection.revoke();
/// assert!(connection.id().is_none());
/// ```
pub struct Connection {
    event: Weak<dyn EventBase>,
    id: ConnectionId,

    // Completes once the first caller to revoke has notified the event. Other callers wait.
    revoked: Once,

    created_at: Instant,
}

impl Connection {
    pub(crate) fn new(event: Weak<dyn EventBase>, id: ConnectionId) -> Self {
        Self {
            event,
            id,
            revoked: Once::new(),
            created_at: Instant::now(),
        }
    }

    /// The id of the registration this handle keeps alive, or `None` if the handle
    /// has already been revoked.
    #[must_use]
    pub fn id(&self) -> Option<ConnectionId> {
        if self.is_revoked() {
            None
        } else {
            Some(self.id)
        }
    }

    /// Whether a call to [`revoke()`][Self::revoke] on this handle has completed.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked.is_completed()
    }

    /// When the registration was made.
    #[must_use]
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Disconnects the callback from its event.
    ///
    /// The callback will not be invoked by any dispatch that starts after this call returns.
    /// A dispatch already in progress on another thread may still invoke it if it has already
    /// checked this registration.
    ///
    /// Calling this more than once, from any number of threads, revokes the registration once.
    /// Concurrent callers block until the revocation is done, so the guarantee above holds for
    /// every caller. If the event has already been dropped, this does nothing.
    pub fn revoke(&self) {
        self.revoked.call_once(|| {
            if let Some(event) = self.event.upgrade() {
                event.revoke(self.id);
            }
        });
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.revoke();
    }
}

impl fmt::Debug for Connection {
    #[cfg_attr(test, mutants::skip)] // No API contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("revoked", &self.is_revoked())
            .field("event_alive", &(self.event.strong_count() > 0))
            .field("created_at", &self.created_at)
            .finish()
    }
}
