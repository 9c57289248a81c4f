//! Event routing: per-type dispatchers and the hub that owns them.

pub mod dispatcher;
pub mod handler;
pub mod hub;

use std::any::Any;

/// Marker trait for values that can travel through a dispatcher.
///
/// Automatically implemented for every thread-safe type with a static
/// lifetime, so callers never implement it by hand.
pub trait Event: Any + Send + Sync + 'static {
    /// Get the name of the event type.
    fn event_name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}

impl<T: Any + Send + Sync + 'static> Event for T {}

/// Capability shared by everything that queues raised events.
///
/// The hub stores its dispatchers behind this trait so that one flush call
/// can drain every event type without knowing the concrete payloads.
pub trait FlushRaised: Send + Sync {
    /// Delivers every event raised before this call began.
    ///
    /// Returns the number of events delivered.
    fn flush_all_raised_events(&self) -> usize;
}
