//! Type-keyed registry of dispatchers.

use std::any::Any;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use log::debug;
use log::info;

use crate::error::DispatchError;
use crate::event::Event;
use crate::event::FlushRaised;
use crate::event::dispatcher::Dispatcher;
use crate::event::handler::Handler;

/// One registered dispatcher, viewed both as a flusher and as its concrete type.
struct Entry {
    flusher: Arc<dyn FlushRaised>,
    typed: Arc<dyn Any + Send + Sync>,
}

impl Entry {
    fn new<E: Event>(dispatcher: Arc<Dispatcher<E>>) -> Self {
        Self {
            flusher: dispatcher.clone(),
            typed: dispatcher,
        }
    }

    fn downcast<E: Event>(&self) -> Option<Arc<Dispatcher<E>>> {
        self.typed.clone().downcast::<Dispatcher<E>>().ok()
    }
}

type Dispatchers = RwLock<HashMap<TypeId, Entry>>;

/// Routes events to one [`Dispatcher`] per event type.
///
/// Dispatchers are created on the first subscription (or explicit lookup
/// through [`Hub::dispatcher_or_create`]) and live as long as the hub.
/// Raising or firing a type that has no dispatcher yet is a no-op, since
/// nobody can be listening.
pub struct Hub {
    dispatchers: Dispatchers,
}

impl Hub {
    pub fn new() -> Self {
        Self {
            dispatchers: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribes `handler` to events of type E, creating the dispatcher if needed.
    pub fn subscribe<E: Event>(&self, handler: &Handler<E>) -> Result<(), DispatchError> {
        self.dispatcher_or_create::<E>().subscribe(handler)
    }

    /// Unsubscribes `handler` from events of type E.
    ///
    /// Fails with [`DispatchError::NoDispatcher`] if nobody ever subscribed to E.
    pub fn unsubscribe<E: Event>(&self, handler: &Handler<E>) -> Result<(), DispatchError> {
        let dispatcher = self
            .dispatcher::<E>()
            .ok_or(DispatchError::NoDispatcher {
                event_type: E::event_name(),
            })?;
        dispatcher.unsubscribe(handler)
    }

    /// Queues `event` for the next [`Hub::flush_all_raised_events`].
    pub fn raise<E: Event>(&self, event: E) {
        match self.dispatcher::<E>() {
            Some(dispatcher) => dispatcher.raise(event),
            None => debug!("No dispatcher for {}, raised event dropped.", E::event_name()),
        }
    }

    /// Delivers `event` immediately to the current subscribers of E.
    pub fn fire<E: Event>(&self, event: E) {
        match self.dispatcher::<E>() {
            Some(dispatcher) => dispatcher.fire(event),
            None => debug!("No dispatcher for {}, fired event dropped.", E::event_name()),
        }
    }

    /// Flushes every registered dispatcher.
    ///
    /// Only per-type order is guaranteed; types are visited in no
    /// particular order. Returns the number of events delivered.
    pub fn flush_all_raised_events(&self) -> usize {
        let flushers: Vec<Arc<dyn FlushRaised>> = read(&self.dispatchers)
            .values()
            .map(|entry| entry.flusher.clone())
            .collect();

        flushers
            .iter()
            .map(|flusher| flusher.flush_all_raised_events())
            .sum()
    }

    /// Returns the dispatcher for E if one has been created.
    pub fn dispatcher<E: Event>(&self) -> Option<Arc<Dispatcher<E>>> {
        read(&self.dispatchers)
            .get(&TypeId::of::<E>())
            .and_then(Entry::downcast::<E>)
    }

    /// Returns the dispatcher for E, registering an empty one if needed.
    pub fn dispatcher_or_create<E: Event>(&self) -> Arc<Dispatcher<E>> {
        if let Some(dispatcher) = self.dispatcher::<E>() {
            return dispatcher;
        }

        let mut dispatchers = write(&self.dispatchers);
        // Another thread may have registered E since the read lock was released.
        if let Some(dispatcher) = dispatchers
            .get(&TypeId::of::<E>())
            .and_then(Entry::downcast::<E>)
        {
            return dispatcher;
        }

        let dispatcher = Arc::new(Dispatcher::<E>::new());
        dispatchers.insert(TypeId::of::<E>(), Entry::new(dispatcher.clone()));
        info!(
            "Registered dispatcher for {} ({} event types).",
            E::event_name(),
            dispatchers.len()
        );
        dispatcher
    }

    /// Number of event types with a dispatcher.
    pub fn dispatcher_count(&self) -> usize {
        read(&self.dispatchers).len()
    }

    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.dispatcher::<E>()
            .map_or(0, |dispatcher| dispatcher.subscriber_count())
    }

    pub fn pending_count<E: Event>(&self) -> usize {
        self.dispatcher::<E>()
            .map_or(0, |dispatcher| dispatcher.pending_count())
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl FlushRaised for Hub {
    fn flush_all_raised_events(&self) -> usize {
        Hub::flush_all_raised_events(self)
    }
}

fn read(dispatchers: &Dispatchers) -> RwLockReadGuard<'_, HashMap<TypeId, Entry>> {
    dispatchers.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(dispatchers: &Dispatchers) -> RwLockWriteGuard<'_, HashMap<TypeId, Entry>> {
    dispatchers.write().unwrap_or_else(PoisonError::into_inner)
}
