//! Integration tests for the background flush cadence.

use std::sync::Arc;
use std::time::Duration;

use evhub::Dispatcher;
use evhub::Hub;
use evhub::task::flush_ticker::FlushTicker;
use tokio::time::sleep;

use crate::common::SimpleEvent;

mod common;

#[test]
fn test_tick_flushes_once() {
    let hub = Arc::new(Hub::new());
    let (handler, counter) = common::counting_handler::<SimpleEvent>();
    hub.subscribe(&handler).unwrap();
    let ticker = FlushTicker::new(hub.clone(), Duration::from_millis(10));

    hub.raise(SimpleEvent::new(1, "a"));
    hub.raise(SimpleEvent::new(2, "b"));
    assert_eq!(ticker.tick(), 2);
    assert_eq!(ticker.tick(), 0);

    assert_eq!(counter.get(), 2);
    assert_eq!(ticker.ticks(), 2);
    assert_eq!(ticker.delivered(), 2);
}

#[test]
fn test_zero_interval_rejected() {
    let ticker = FlushTicker::new(Arc::new(Hub::new()), Duration::ZERO);
    assert!(ticker.clone().start().is_err());
    assert!(!ticker.is_running());
}

#[tokio::test]
async fn test_ticker_flushes_in_background() {
    let hub = Arc::new(Hub::new());
    let (handler, counter) = common::counting_handler::<SimpleEvent>();
    hub.subscribe(&handler).unwrap();

    let ticker = FlushTicker::new(hub.clone(), Duration::from_millis(10));
    ticker.clone().start().expect("Failed to start ticker");
    assert!(ticker.is_running());

    hub.raise(SimpleEvent::new(1, "background"));

    let mut attempts = 0;
    while counter.get() == 0 && attempts < 50 {
        sleep(Duration::from_millis(10)).await;
        attempts += 1;
    }
    assert_eq!(counter.get(), 1, "Ticker did not flush the hub");
    assert_eq!(hub.pending_count::<SimpleEvent>(), 0);

    ticker.clone().stop().unwrap();
}

#[tokio::test]
async fn test_stopped_ticker_leaves_events_queued() {
    let dispatcher = Arc::new(Dispatcher::<u32>::new());
    let (handler, counter) = common::counting_handler();
    dispatcher.subscribe(&handler).unwrap();

    let ticker = FlushTicker::new(dispatcher.clone(), Duration::from_millis(10));
    ticker.clone().start().unwrap();
    ticker.clone().stop().unwrap();
    assert!(!ticker.is_running());

    dispatcher.raise(1);
    sleep(Duration::from_millis(50)).await;

    assert_eq!(counter.get(), 0);
    assert_eq!(dispatcher.pending_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_restart_runs_single_tick_loop() {
    let ticker = FlushTicker::new(Arc::new(Hub::new()), Duration::from_millis(10));
    ticker.clone().start().unwrap();
    ticker.clone().stop().unwrap();
    ticker.clone().start().unwrap();

    // Ticks at 0, 10, 20 and 30 ms from the restarted loop only.
    sleep(Duration::from_millis(35)).await;
    ticker.clone().stop_and_wait().await.unwrap();
    assert_eq!(ticker.ticks(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_stop_and_wait_ends_background_loop() {
    let hub = Arc::new(Hub::new());
    let (handler, counter) = common::counting_handler::<SimpleEvent>();
    hub.subscribe(&handler).unwrap();

    let ticker = FlushTicker::new(hub.clone(), Duration::from_millis(10));
    ticker.clone().start().unwrap();
    sleep(Duration::from_millis(25)).await;
    ticker.clone().stop_and_wait().await.unwrap();
    assert!(!ticker.is_running());

    let ticks = ticker.ticks();
    hub.raise(SimpleEvent::new(1, "after stop"));
    sleep(Duration::from_millis(50)).await;
    assert_eq!(ticker.ticks(), ticks);
    assert_eq!(counter.get(), 0);

    assert_eq!(ticker.tick(), 1);
    assert_eq!(counter.get(), 1);
}

#[tokio::test]
async fn test_stop_and_wait_without_start() {
    let ticker = FlushTicker::new(Arc::new(Hub::new()), Duration::from_millis(10));
    ticker.clone().stop_and_wait().await.unwrap();
    assert_eq!(ticker.ticks(), 0);
}
