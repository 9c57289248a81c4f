//! Per-type dispatcher with a double-buffered event queue.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use log::debug;
use log::warn;

use crate::error::DispatchError;
use crate::event::Event;
use crate::event::FlushRaised;
use crate::event::handler::Handler;

/// Locks `mutex`, recovering the data if a previous holder panicked.
///
/// Critical sections in this module never call user code, so the guarded
/// state is consistent even after a poisoning panic elsewhere.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Two queues and the index of the one accepting new events.
struct Buffers<E> {
    queues: [VecDeque<E>; 2],
    active: usize,
}

impl<E> Buffers<E> {
    fn new() -> Self {
        Self {
            queues: [VecDeque::new(), VecDeque::new()],
            active: 0,
        }
    }

    fn split(&mut self) -> (&mut VecDeque<E>, &mut VecDeque<E>) {
        let [first, second] = &mut self.queues;
        if self.active == 0 {
            (first, second)
        } else {
            (second, first)
        }
    }

    fn active(&self) -> &VecDeque<E> {
        &self.queues[self.active]
    }

    fn total(&self) -> usize {
        self.queues[0].len() + self.queues[1].len()
    }

    fn push(&mut self, event: E) {
        self.split().0.push_back(event);
    }

    fn pop_inactive(&mut self) -> Option<E> {
        self.split().1.pop_front()
    }

    /// Moves everything raised so far to the inactive side.
    ///
    /// Normally a flip. When a previous flush was aborted by a panicking
    /// handler the inactive side still holds its leftovers; the active
    /// events are appended behind them instead so nothing is reordered.
    fn begin_flush(&mut self) {
        let (active, inactive) = self.split();
        if inactive.is_empty() {
            self.active = 1 - self.active;
        } else {
            inactive.append(active);
        }
    }
}

/// Resets the flushing flag even when a handler unwinds.
struct FlushGuard<'a>(&'a AtomicBool);

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Subscriber list and deferred queue for a single event type.
///
/// Events can be delivered immediately with [`Dispatcher::fire`] or queued
/// with [`Dispatcher::raise`] and delivered later by
/// [`Dispatcher::flush_all`]. Handlers may call back into the dispatcher
/// while an event is being delivered:
/// - subscription changes take effect from the next delivery on;
/// - events raised during a flush wait for the next flush.
pub struct Dispatcher<E> {
    subscribers: Mutex<Vec<Handler<E>>>,
    buffers: Mutex<Buffers<E>>,
    flushing: AtomicBool,
}

impl<E: Event> Dispatcher<E> {
    /// Creates a dispatcher with no subscribers and no queued events.
    pub fn new() -> Self {
        debug!("Creating dispatcher for {}.", E::event_name());
        Self {
            subscribers: Mutex::new(Vec::new()),
            buffers: Mutex::new(Buffers::new()),
            flushing: AtomicBool::new(false),
        }
    }

    /// Subscribes `handler` to every future delivery.
    ///
    /// Fails if this exact handler (or a clone of it) is already subscribed.
    pub fn subscribe(&self, handler: &Handler<E>) -> Result<(), DispatchError> {
        let mut subscribers = lock(&self.subscribers);
        if subscribers.contains(handler) {
            warn!("Rejected duplicate subscription to {}.", E::event_name());
            return Err(DispatchError::DuplicateSubscriber {
                event_type: E::event_name(),
            });
        }
        subscribers.push(handler.clone());
        debug!(
            "Subscribed {:?} ({} subscribers).",
            handler,
            subscribers.len()
        );
        Ok(())
    }

    /// Removes `handler` from the subscriber list.
    ///
    /// Fails if the handler is not currently subscribed.
    pub fn unsubscribe(&self, handler: &Handler<E>) -> Result<(), DispatchError> {
        let mut subscribers = lock(&self.subscribers);
        let Some(index) = subscribers.iter().position(|h| h == handler) else {
            warn!("Rejected unsubscription of unknown {:?}.", handler);
            return Err(DispatchError::NotSubscribed {
                event_type: E::event_name(),
            });
        };
        subscribers.remove(index);
        debug!(
            "Unsubscribed {:?} ({} subscribers).",
            handler,
            subscribers.len()
        );
        Ok(())
    }

    /// Queues `event` until the next flush.
    pub fn raise(&self, event: E) {
        lock(&self.buffers).push(event);
    }

    /// Delivers `event` to all current subscribers before returning.
    pub fn fire(&self, event: E) {
        self.deliver(&event);
    }

    /// Delivers every event raised before this call, in raise order.
    ///
    /// Returns the number of events delivered. A flush requested while
    /// another flush of this dispatcher is running does nothing.
    pub fn flush_all(&self) -> usize {
        if self
            .flushing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(
                "Flush of {} requested while already flushing, skipped.",
                E::event_name()
            );
            return 0;
        }
        let _guard = FlushGuard(&self.flushing);

        lock(&self.buffers).begin_flush();

        let mut delivered = 0;
        while let Some(event) = self.pop_inactive() {
            self.deliver(&event);
            delivered += 1;
        }

        if delivered > 0 {
            debug!("Flushed {} {} events.", delivered, E::event_name());
        }
        delivered
    }

    /// Number of raised events waiting for the next flush.
    ///
    /// Outside a flush this includes leftovers of a pass aborted by a
    /// panicking handler. During a flush only the active buffer counts.
    pub fn pending_count(&self) -> usize {
        let buffers = lock(&self.buffers);
        if self.flushing.load(Ordering::Acquire) {
            buffers.active().len()
        } else {
            buffers.total()
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).len()
    }

    pub fn is_subscribed(&self, handler: &Handler<E>) -> bool {
        lock(&self.subscribers).contains(handler)
    }

    fn pop_inactive(&self) -> Option<E> {
        lock(&self.buffers).pop_inactive()
    }

    fn deliver(&self, event: &E) {
        // Snapshot so handlers can (un)subscribe without affecting this pass.
        let subscribers = lock(&self.subscribers).clone();
        for handler in &subscribers {
            handler.call(event);
        }
    }
}

impl<E: Event> Default for Dispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> FlushRaised for Dispatcher<E> {
    fn flush_all_raised_events(&self) -> usize {
        self.flush_all()
    }
}
