//! Typed events that invoke connected callbacks synchronously.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::{CallbackError, Connection, ConnectionId, Error, EventBase, EventBuilder};

type Callback<A> = dyn Fn(&A) -> Result<(), CallbackError> + Send + Sync;

/// One registered callback.
struct Entry<A> {
    id: ConnectionId,

    // Cleared by a disconnect. Checked without the lock right before invoking the callback.
    enabled: AtomicBool,

    callback: Box<Callback<A>>,
}

/// The mutable bookkeeping of an event, guarded by a single lock.
struct Registrations<A> {
    // Sorted by ascending id, which is also connection order.
    //
    // Every dispatch iterates its own clone of this `Arc` with the lock released. A mutation
    // while such a snapshot is alive copies the list instead of touching the snapshot, so
    // nothing a dispatch is iterating ever moves or goes away under it.
    entries: Arc<Vec<Arc<Entry<A>>>>,

    // Ids that have been disabled but are still in `entries`. Erased by the next dispatch.
    pending_removal: Vec<ConnectionId>,

    next_id: u64,
}

impl<A> Registrations<A> {
    fn new() -> Self {
        Self {
            entries: Arc::new(Vec::new()),
            pending_removal: Vec::new(),
            next_id: 0,
        }
    }

    fn find(&self, id: ConnectionId) -> Option<&Arc<Entry<A>>> {
        self.entries
            .binary_search_by_key(&id, |entry| entry.id)
            .ok()
            .and_then(|index| self.entries.get(index))
    }
}

/// State shared between an [`Event`] and the [`Connection`]s it hands out.
///
/// The event holds the only strong reference; connections hold weak ones.
struct Shared<A> {
    name: Cow<'static, str>,
    signaled: AtomicBool,
    registrations: Mutex<Registrations<A>>,
}

impl<A> Shared<A>
where
    A: 'static,
{
    fn new(name: Cow<'static, str>) -> Self {
        Self {
            name,
            signaled: AtomicBool::new(false),
            registrations: Mutex::new(Registrations::new()),
        }
    }

    fn connect(self: &Arc<Self>, callback: Box<Callback<A>>) -> Connection {
        let id = {
            let mut registrations = self.registrations.lock();

            let id = ConnectionId::new(registrations.next_id);
            registrations.next_id = registrations
                .next_id
                .checked_add(1)
                .expect("an event cannot issue more than u64::MAX connection ids");

            Arc::make_mut(&mut registrations.entries).push(Arc::new(Entry {
                id,
                enabled: AtomicBool::new(true),
                callback,
            }));

            id
        };

        trace!(event = %self.name, connection = %id, "callback connected");

        let event: Weak<Self> = Arc::downgrade(self);
        Connection::new(event, id)
    }

    fn disconnect(&self, id: ConnectionId) {
        let mut registrations = self.registrations.lock();

        let newly_disabled = registrations
            .find(id)
            .is_some_and(|entry| entry.enabled.swap(false, Ordering::Release));

        if !newly_disabled {
            return;
        }

        registrations.pending_removal.push(id);
        drop(registrations);

        trace!(event = %self.name, connection = %id, "callback disconnected");
    }

    fn is_connected(&self, id: ConnectionId) -> bool {
        self.registrations
            .lock()
            .find(id)
            .is_some_and(|entry| entry.enabled.load(Ordering::Acquire))
    }

    fn connection_count(&self) -> usize {
        self.registrations.lock().entries.len()
    }

    /// Erases everything pending removal and returns the entries the caller should iterate.
    fn purge_and_snapshot(&self) -> Arc<Vec<Arc<Entry<A>>>> {
        let mut guard = self.registrations.lock();
        let registrations = &mut *guard;

        if !registrations.pending_removal.is_empty() {
            registrations.pending_removal.sort_unstable();

            let pending = &registrations.pending_removal;
            Arc::make_mut(&mut registrations.entries)
                .retain(|entry| pending.binary_search(&entry.id).is_err());

            trace!(
                event = %self.name,
                purged = pending.len(),
                remaining = registrations.entries.len(),
                "purged disconnected callbacks"
            );

            registrations.pending_removal.clear();
        }

        Arc::clone(&registrations.entries)
    }
}

impl<A> EventBase for Shared<A>
where
    A: 'static,
{
    fn signaled(&self) -> bool {
        self.signaled.load(Ordering::Acquire)
    }

    fn set_signaled(&self, signaled: bool) {
        self.signaled.store(signaled, Ordering::Release);
    }

    fn revoke(&self, id: ConnectionId) {
        self.disconnect(id);
    }
}

/// An event that synchronously invokes every connected callback when dispatched.
///
/// Callbacks receive the dispatched arguments by shared reference. Use a tuple as `A` for
/// callbacks that take several values. The optional marker type `N` distinguishes events that
/// carry the same argument type, which matters when looking events up by type in an
/// [`EventRegistry`][crate::EventRegistry].
///
/// # Connections
///
/// [`connect()`][Self::connect] returns a [`Connection`] that keeps the callback connected until
/// it is revoked or dropped. Disconnecting never removes the callback immediately: it is flagged
/// as disabled and physically erased at the start of the next dispatch. Because of this, it is
/// safe to connect, disconnect or drop connections at any time - from other threads while a
/// dispatch is running, or from inside a callback of the very event being dispatched.
///
/// # Dispatch
///
/// [`dispatch()`][Self::dispatch] invokes callbacks on the calling thread, in connection order.
/// It takes a snapshot of the connected callbacks when it starts, so callbacks connected during
/// a dispatch are first invoked by the next one. No lock is held while a callback runs.
///
/// If a callback returns an error, the dispatch stops at that callback and returns the error.
/// A panicking callback unwinds through the dispatch in the same way. In both cases the event
/// remains fully usable.
///
/// Multiple threads may dispatch the same event concurrently, in which case a callback may be
/// invoked from several threads at once.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// use signals::Event;
///
/// let event = Event::<u32>::new();
/// let total = Arc::new(AtomicU32::new(0));
///
/// let connection = event.connect({
///     let total = Arc::clone(&total);
///     move |value| {
///         total.fetch_add(*value, Ordering::Relaxed);
///     }
/// });
///
/// event.dispatch(&5).unwrap();
/// drop(connection);
/// event.dispatch(&7).unwrap();
///
/// assert_eq!(total.load(Ordering::Relaxed), 5);
/// ```
pub struct Event<A, N = ()> {
    shared: Arc<Shared<A>>,

    _marker: PhantomData<fn() -> N>,
}

impl<A, N> Event<A, N>
where
    A: 'static,
{
    /// Creates a new event without a name.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building an event with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use signals::Event;
    ///
    /// let event = Event::<String>::builder().name("scene_loaded").build();
    /// assert_eq!(event.name(), "scene_loaded");
    /// ```
    #[must_use]
    pub fn builder() -> EventBuilder<A, N> {
        EventBuilder::new()
    }

    pub(crate) fn with_name(name: Cow<'static, str>) -> Self {
        Self {
            shared: Arc::new(Shared::new(name)),
            _marker: PhantomData,
        }
    }

    /// The diagnostic name of the event, used in log records. Empty if none was configured.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Connects a callback to the event.
    ///
    /// The callback stays connected until the returned [`Connection`] is revoked or dropped,
    /// or until [`disconnect()`][Self::disconnect] is called with its id.
    #[must_use = "dropping the connection immediately disconnects the callback"]
    pub fn connect<F>(&self, callback: F) -> Connection
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        self.shared.connect(Box::new(move |args: &A| {
            callback(args);
            Ok(())
        }))
    }

    /// Connects a callback that can fail.
    ///
    /// An error returned by the callback aborts the dispatch that invoked it and is returned
    /// from [`dispatch()`][Self::dispatch] as [`Error::CallbackFailed`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use signals::Event;
    ///
    /// let event = Event::<i32>::new();
    /// let _connection = event.connect_fallible(|value| {
    ///     if *value < 0 {
    ///         return Err("negative values are not accepted");
    ///     }
    ///     Ok(())
    /// });
    ///
    /// assert!(event.dispatch(&1).is_ok());
    /// assert!(event.dispatch(&-1).is_err());
    /// ```
    #[must_use = "dropping the connection immediately disconnects the callback"]
    pub fn connect_fallible<F, E>(&self, callback: F) -> Connection
    where
        F: Fn(&A) -> Result<(), E> + Send + Sync + 'static,
        E: Into<CallbackError>,
    {
        self.shared
            .connect(Box::new(move |args: &A| callback(args).map_err(Into::into)))
    }

    /// Disconnects the callback registered under `id`.
    ///
    /// The callback will not be invoked by any dispatch that starts after this call. Ids that
    /// are unknown or already disconnected are ignored.
    ///
    /// The registration still counts towards [`connection_count()`][Self::connection_count]
    /// until the next dispatch erases it.
    pub fn disconnect(&self, id: ConnectionId) {
        self.shared.disconnect(id);
    }

    /// Whether a callback is connected under `id` and has not been disconnected.
    #[must_use]
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.shared.is_connected(id)
    }

    /// The number of registrations held by the event.
    ///
    /// This includes disconnected callbacks that have not yet been erased by a dispatch.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.shared.connection_count()
    }

    /// Invokes every connected callback with `args`, in connection order, on the calling thread.
    ///
    /// Marks the event as [signaled][EventBase::signaled], even if no callbacks are connected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CallbackFailed`] for the first callback that returns an error. Callbacks
    /// after it are not invoked by this dispatch.
    pub fn dispatch(&self, args: &A) -> Result<(), Error> {
        let snapshot = self.shared.purge_and_snapshot();

        self.shared.set_signaled(true);

        for entry in &*snapshot {
            // A disconnect landing after this check does not stop the callback from running
            // this one time. Only dispatches that start after the disconnect are guaranteed
            // to skip it.
            if !entry.enabled.load(Ordering::Acquire) {
                continue;
            }

            if let Err(source) = (entry.callback)(args) {
                debug!(
                    event = %self.shared.name,
                    connection = %entry.id,
                    error = %source,
                    "callback failed, aborting dispatch"
                );

                return Err(Error::CallbackFailed {
                    connection: entry.id,
                    source,
                });
            }
        }

        Ok(())
    }
}

impl<A, N> EventBase for Event<A, N>
where
    A: 'static,
    N: 'static,
{
    fn signaled(&self) -> bool {
        self.shared.signaled()
    }

    fn set_signaled(&self, signaled: bool) {
        self.shared.set_signaled(signaled);
    }

    fn revoke(&self, id: ConnectionId) {
        self.shared.disconnect(id);
    }
}

impl<A, N> Default for Event<A, N>
where
    A: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A, N> fmt::Debug for Event<A, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let connection_count = self.shared.registrations.lock().entries.len();

        f.debug_struct("Event")
            .field("name", &self.shared.name)
            .field("connection_count", &connection_count)
            .field("signaled", &self.shared.signaled.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
