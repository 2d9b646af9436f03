//! Configuration of new events.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use crate::Event;

/// Creates instances of [`Event`] with custom configuration.
///
/// Use [`Event::builder()`] to create a new instance of this builder. Every setting is optional;
/// an event built without any settings is identical to one from [`Event::new()`].
pub struct EventBuilder<A, N = ()> {
    name: Cow<'static, str>,

    _event: PhantomData<fn() -> Event<A, N>>,
}

impl<A, N> EventBuilder<A, N>
where
    A: 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            name: Cow::Borrowed(""),
            _event: PhantomData,
        }
    }

    /// Sets the name of the event, attached to every log record the event emits.
    ///
    /// Recommended format: `subsystem_what_happened`, for example `scene_entity_spawned`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use signals::Event;
    ///
    /// let event = Event::<u64>::builder().name("scene_entity_spawned").build();
    /// ```
    #[must_use]
    pub fn name(self, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    /// Creates the event.
    #[must_use]
    pub fn build(self) -> Event<A, N> {
        Event::with_name(self.name)
    }
}

impl<A, N> fmt::Debug for EventBuilder<A, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBuilder")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
