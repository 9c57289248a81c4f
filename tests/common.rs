//! Common test fixtures and handler helpers.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use evhub::Event;
use evhub::Handler;

/// Flat event payload.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub struct SimpleEvent {
    pub id: u32,
    pub name: String,
}

#[allow(dead_code)]
impl SimpleEvent {
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

/// Event payload owning a heap collection.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub struct ComplexEvent {
    pub dates: Vec<i32>,
}

#[allow(dead_code)]
impl ComplexEvent {
    pub fn new(a: i32, b: i32) -> Self {
        Self { dates: vec![a, b] }
    }
}

/// Shared call counter observed by a handler.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct Counter(Arc<AtomicUsize>);

#[allow(dead_code)]
impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handler that counts every event it receives.
#[allow(dead_code)]
pub fn counting_handler<E: Event>() -> (Handler<E>, Counter) {
    let counter = Counter::new();
    let seen = counter.clone();
    (Handler::new(move |_: &E| seen.incr()), counter)
}

/// Handler that records a copy of every event it receives.
#[allow(dead_code)]
pub fn recording_handler<E: Event + Clone>() -> (Handler<E>, Arc<Mutex<Vec<E>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let handler = Handler::new(move |event: &E| sink.lock().unwrap().push(event.clone()));
    (handler, log)
}
