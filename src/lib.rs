//! evhub - an in-process event hub with deferred, double-buffered dispatch.
//!
//! Events are routed by their Rust type to a per-type [`Dispatcher`]:
//! - `fire` delivers to every current subscriber immediately;
//! - `raise` queues the event until the next flush, usually once per tick.
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicUsize;
//! use std::sync::atomic::Ordering;
//!
//! use evhub::Handler;
//! use evhub::Hub;
//!
//! struct Tick(u64);
//!
//! let hub = Hub::new();
//! let ticks = Arc::new(AtomicUsize::new(0));
//! let counter = ticks.clone();
//! let handler = Handler::new(move |_: &Tick| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! hub.subscribe(&handler).unwrap();
//! hub.raise(Tick(1));
//! assert_eq!(ticks.load(Ordering::SeqCst), 0);
//!
//! hub.flush_all_raised_events();
//! assert_eq!(ticks.load(Ordering::SeqCst), 1);
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod task;

pub use error::DispatchError;
pub use event::Event;
pub use event::FlushRaised;
pub use event::dispatcher::Dispatcher;
pub use event::handler::Handler;
pub use event::handler::Subscriber;
pub use event::hub::Hub;
