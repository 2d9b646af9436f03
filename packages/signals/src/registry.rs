//! Shared events looked up by type.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::{Event, EventBase};

/// One registered event, viewed both as its concrete type (for lookup) and as
/// [`EventBase`] (for type-independent queries). Both point to the same allocation.
struct Registered {
    concrete: Arc<dyn Any + Send + Sync>,
    base: Arc<dyn EventBase>,
}

/// A collection of shared events, at most one per event type.
///
/// Events are created on first access. The key is the full event type, so `Event<A, N>` with
/// different marker types `N` are distinct entries even if they carry the same arguments.
///
/// # Example
///
/// ```rust
/// use signals::EventRegistry;
///
/// struct Paused;
/// struct Resumed;
///
/// let registry = EventRegistry::new();
///
/// let paused = registry.get::<(), Paused>();
/// let _connection = paused.connect(|()| println!("paused"));
///
/// // Same type key, same event.
/// registry.get::<(), Paused>().dispatch(&()).unwrap();
///
/// // Different marker, different event.
/// assert_eq!(registry.get::<(), Resumed>().connection_count(), 0);
/// assert_eq!(registry.len(), 2);
/// ```
#[derive(Default)]
pub struct EventRegistry {
    events: Mutex<HashMap<TypeId, Registered>>,
}

impl EventRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the event of type `Event<A, N>`, creating it if this is the first request.
    ///
    /// Events created by the registry are named after their type.
    #[must_use]
    pub fn get<A, N>(&self) -> Arc<Event<A, N>>
    where
        A: 'static,
        N: 'static,
    {
        let mut events = self.events.lock();

        let registered = events.entry(TypeId::of::<Event<A, N>>()).or_insert_with(|| {
            trace!(event = type_name::<Event<A, N>>(), "registering event");

            let event = Arc::new(
                Event::<A, N>::builder()
                    .name(type_name::<Event<A, N>>())
                    .build(),
            );

            let concrete: Arc<dyn Any + Send + Sync> = Arc::<Event<A, N>>::clone(&event);
            Registered {
                concrete,
                base: event,
            }
        });

        downcast(registered)
    }

    /// Returns the event of type `Event<A, N>` if it has already been created.
    #[must_use]
    pub fn get_existing<A, N>(&self) -> Option<Arc<Event<A, N>>>
    where
        A: 'static,
        N: 'static,
    {
        self.events
            .lock()
            .get(&TypeId::of::<Event<A, N>>())
            .map(downcast::<A, N>)
    }

    /// The number of events in the registry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether no event has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// The number of registered events that have been signaled.
    #[must_use]
    pub fn signaled_count(&self) -> usize {
        self.events
            .lock()
            .values()
            .filter(|registered| registered.base.signaled())
            .count()
    }
}

fn downcast<A, N>(registered: &Registered) -> Arc<Event<A, N>>
where
    A: 'static,
    N: 'static,
{
    Arc::clone(&registered.concrete)
        .downcast::<Event<A, N>>()
        .unwrap_or_else(|_| {
            panic!(
                "registry entry for {} holds a different type",
                type_name::<Event<A, N>>()
            )
        })
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use static_assertions::assert_impl_all;

    use super::*;

    #[derive(Debug)]
    struct Loaded;

    #[derive(Debug)]
    struct Unloaded;

    #[test]
    fn thread_safe_types() {
        assert_impl_all!(EventRegistry: Send, Sync, Default);
    }

    #[test]
    fn starts_empty() {
        let registry = EventRegistry::new();

        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.get_existing::<i32, ()>().is_none());
    }

    #[test]
    fn get_returns_same_instance_for_same_type() {
        let registry = EventRegistry::new();

        let first = registry.get::<i32, ()>();
        let second = registry.get::<i32, ()>();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn marker_types_separate_events() {
        let registry = EventRegistry::new();

        let loaded = registry.get::<String, Loaded>();
        let unloaded = registry.get::<String, Unloaded>();

        let _connection = loaded.connect(|_| {});

        assert_eq!(loaded.connection_count(), 1);
        assert_eq!(unloaded.connection_count(), 0);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn get_existing_finds_created_event() {
        let registry = EventRegistry::new();
        let created = registry.get::<u8, Loaded>();

        let found = registry.get_existing::<u8, Loaded>().unwrap();

        assert!(Arc::ptr_eq(&created, &found));
        assert!(registry.get_existing::<u8, Unloaded>().is_none());
    }

    #[test]
    fn dispatch_through_registry_reaches_connections() {
        let registry = EventRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let _connection = registry.get::<usize, ()>().connect({
            let hits = Arc::clone(&hits);
            move |value| {
                hits.fetch_add(*value, Ordering::Relaxed);
            }
        });

        registry.get::<usize, ()>().dispatch(&3).unwrap();

        assert_eq!(hits.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn signaled_count_tracks_dispatched_events() {
        let registry = EventRegistry::new();

        let loaded = registry.get::<(), Loaded>();
        let _unloaded = registry.get::<(), Unloaded>();
        assert_eq!(registry.signaled_count(), 0);

        loaded.dispatch(&()).unwrap();

        assert_eq!(registry.signaled_count(), 1);
    }

    #[test]
    fn events_are_named_after_their_type() {
        let registry = EventRegistry::new();

        let event = registry.get::<u16, Loaded>();

        assert!(event.name().contains("Loaded"));
    }

    #[test]
    fn concurrent_get_creates_one_event() {
        const THREADS: usize = 8;

        let registry = EventRegistry::new();

        let events: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| s.spawn(|| registry.get::<i64, Loaded>()))
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        let expected = registry.get::<i64, Loaded>();
        assert_eq!(registry.len(), 1);
        assert!(events.iter().all(|event| Arc::ptr_eq(event, &expected)));
    }
}
