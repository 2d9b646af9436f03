#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Typed, thread-safe events with revoke-on-drop connections.
//!
//! An [`Event<A>`][Event] holds any number of callbacks taking `&A`. Connecting a callback
//! returns a [`Connection`] that keeps it connected; dispatching the event invokes every connected
//! callback synchronously, on the calling thread, in the order they were connected.
//!
//! ```rust
//! use signals::Event;
//!
//! let event = Event::<i32>::new();
//!
//! let connection = event.connect(|value| println!("first: {value}"));
//! let _other = event.connect(|value| println!("second: {value}"));
//!
//! event.dispatch(&5).unwrap(); // Prints "first: 5" then "second: 5".
//!
//! drop(connection);
//! event.dispatch(&7).unwrap(); // Prints "second: 7".
//! ```
//!
//! # Disconnecting
//!
//! A callback is disconnected when its [`Connection`] is dropped or [revoked][Connection::revoke],
//! or when [`Event::disconnect()`] is called with its [`ConnectionId`]. All three are equivalent
//! and can be combined freely - only the first one has an effect.
//!
//! Disconnecting is always safe, no matter what the event is doing at the time:
//!
//! * A callback may disconnect itself, or any other callback of the same event, while it is
//!   being invoked. Callbacks may also connect new callbacks to the event they are invoked by;
//!   those are first invoked by the next dispatch.
//! * Another thread may disconnect a callback while a dispatch is in progress. The callback is
//!   guaranteed not to be invoked by any dispatch that starts afterwards. The in-progress
//!   dispatch skips it unless it had already reached it.
//! * A connection may outlive its event. Dropping it afterwards does nothing.
//!
//! # Failing callbacks
//!
//! Callbacks connected via [`Event::connect_fallible()`] may return an error. The first error
//! aborts the dispatch and is returned from [`Event::dispatch()`] as [`Error::CallbackFailed`];
//! callbacks after the failing one are not invoked by that dispatch.
//!
//! # Shared events
//!
//! [`EventRegistry`] holds one shared event per event type, created on first use. Combine it with
//! the marker type parameter of [`Event<A, N>`][Event] to define any number of distinct events
//! that carry the same argument type.
//!
//! # Logging
//!
//! The package emits `tracing` records at `trace` level for connection bookkeeping and at `debug`
//! level when a callback error aborts a dispatch. Give an event a name via
//! [`Event::builder()`] to tell events apart in the logs.

mod connection;
mod error;
mod event;
mod event_base;
mod event_builder;
mod registry;

#[cfg(test)]
mod test_utils;

pub use connection::{Connection, ConnectionId};
pub use error::{CallbackError, Error};
pub use event::Event;
pub use event_base::EventBase;
pub use event_builder::EventBuilder;
pub use registry::EventRegistry;
