//! Background task that flushes raised events at a fixed cadence.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use log::debug;
use log::info;
use tokio::task::JoinHandle;
use tracing::Instrument;
use tracing::info_span;

use crate::event::FlushRaised;
use crate::event::dispatcher::lock;

/// Task that calls [`FlushRaised::flush_all_raised_events`] once per tick.
///
/// Raised events are only ever delivered by a flush, so a host that does
/// not run its own frame loop starts one of these next to its hub.
pub struct FlushTicker {
    target: Arc<dyn FlushRaised>,
    interval: Duration,
    running: AtomicBool,
    tick_loop: Mutex<Option<JoinHandle<()>>>,
    ticks: AtomicU64,
    delivered: AtomicU64,
}

impl FlushTicker {
    /// Creates a ticker flushing `target` every `interval`.
    pub fn new(target: Arc<dyn FlushRaised>, interval: Duration) -> Arc<Self> {
        info!("Initializing FlushTicker with interval {:?}", interval);
        Arc::new(Self {
            target,
            interval,
            running: AtomicBool::new(false),
            tick_loop: Mutex::new(None),
            ticks: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
        })
    }

    /// Starts the flush loop. Must be called from within a tokio runtime.
    pub fn start(self: Arc<Self>) -> anyhow::Result<()> {
        if self.interval.is_zero() {
            anyhow::bail!("FlushTicker interval must be greater than zero");
        }
        if !self.running.swap(true, Ordering::SeqCst) {
            info!("Starting FlushTicker loop.");
            self.spawn_tick_loop();
        }
        Ok(())
    }

    /// Stops the flush loop. A tick already in progress still completes.
    pub fn stop(self: Arc<Self>) -> anyhow::Result<()> {
        self.halt();
        Ok(())
    }

    /// Stops the flush loop and waits until it has exited.
    ///
    /// Afterwards no background flush is running, so [`FlushTicker::tick`]
    /// can drain the target without being skipped.
    pub async fn stop_and_wait(self: Arc<Self>) -> anyhow::Result<()> {
        let Some(tick_loop) = self.halt() else {
            return Ok(());
        };
        match tick_loop.await {
            Ok(()) => Ok(()),
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Runs one flush on the calling thread and returns the events delivered.
    pub fn tick(&self) -> usize {
        let delivered = self.target.flush_all_raised_events();
        self.ticks.fetch_add(1, Ordering::SeqCst);
        self.delivered.fetch_add(delivered as u64, Ordering::SeqCst);
        if delivered > 0 {
            debug!("Tick delivered {} events.", delivered);
        }
        delivered
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Total events delivered across all ticks.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::SeqCst)
    }

    fn halt(&self) -> Option<JoinHandle<()>> {
        info!("Stopping FlushTicker loop.");
        self.running.store(false, Ordering::SeqCst);
        let tick_loop = lock(&self.tick_loop).take();
        if let Some(tick_loop) = &tick_loop {
            tick_loop.abort();
        }
        tick_loop
    }

    fn spawn_tick_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.interval);
        let ticker = self.clone();
        let tick_loop = tokio::spawn(
            async move {
                loop {
                    interval.tick().await;
                    if !ticker.running.load(Ordering::SeqCst) {
                        info!("Stopping tick loop.");
                        break;
                    }
                    ticker.tick();
                }
            }
            .instrument(info_span!("flush_ticker")),
        );
        // A loop left over from a stop/start race must not keep ticking.
        if let Some(previous) = lock(&self.tick_loop).replace(tick_loop) {
            previous.abort();
        }
    }
}
