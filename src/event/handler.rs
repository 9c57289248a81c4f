//! Event handlers and their identity.

use std::fmt;
use std::sync::Arc;

use crate::event::Event;

type Callback<E> = dyn Fn(&E) + Send + Sync;

/// Trait for struct-style event subscribers.
pub trait Subscriber<E>: Send + Sync {
    /// Called once for every delivered event of type E.
    fn on_event(&self, event: &E);
}

/// A shared callable that receives events of type `E`.
///
/// Two handlers are equal only when one is a clone of the other. Keep the
/// value returned by [`Handler::new`] around and pass clones of it to
/// subscribe and unsubscribe; wrapping the same closure twice yields two
/// distinct handlers.
pub struct Handler<E> {
    callback: Arc<Callback<E>>,
}

impl<E: Event> Handler<E> {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Wraps a subscriber so it can be registered with a dispatcher.
    pub fn from_subscriber<S>(subscriber: Arc<S>) -> Self
    where
        S: Subscriber<E> + 'static,
    {
        Self::new(move |event: &E| subscriber.on_event(event))
    }

    pub(crate) fn call(&self, event: &E) {
        (self.callback)(event)
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.callback) as *const ()
    }
}

impl<E> Clone for Handler<E> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<E: Event> PartialEq for Handler<E> {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl<E: Event> Eq for Handler<E> {}

impl<E: Event> fmt::Debug for Handler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler<{}>({:p})", E::event_name(), self.addr())
    }
}
