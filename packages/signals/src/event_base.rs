//! The type-independent face of an event.

use std::any::Any;

use crate::ConnectionId;

/// Operations shared by every event, regardless of its argument type.
///
/// This is what a [`Connection`][crate::Connection] talks to when it is revoked, and what an
/// [`EventRegistry`][crate::EventRegistry] uses to look at events of different types uniformly.
/// Dispatching is not part of this trait - it always goes through the concrete
/// [`Event`][crate::Event] type.
pub trait EventBase: Any + Send + Sync {
    /// Whether the event has been dispatched at least once (or flagged via
    /// [`set_signaled()`][Self::set_signaled]).
    fn signaled(&self) -> bool;

    /// Overrides the signaled flag.
    ///
    /// Dispatching sets the flag to `true`. Nothing ever resets it to `false` except an explicit
    /// call to this method.
    fn set_signaled(&self, signaled: bool);

    /// Disconnects the callback registered under `id`.
    ///
    /// Unknown or already disconnected ids are ignored. This may be called at any time from any
    /// thread, including from inside a callback that is being invoked by a dispatch of the same
    /// event.
    fn revoke(&self, id: ConnectionId);
}
