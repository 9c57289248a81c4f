//! Demo host loop for evhub.
//!
//! Raises a `Ping` every tick while a [`FlushTicker`] flushes the hub in the
//! background. Each delivered `Ping` raises a `Pong`, which is delivered on
//! the following tick.

use std::sync::Arc;
use std::sync::Weak;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Instant;

use anyhow::Result;
use dotenv::dotenv;
use evhub::Handler;
use evhub::Hub;
use evhub::config::Config;
use evhub::logging::setup_logging;
use evhub::task::flush_ticker::FlushTicker;
use log::debug;
use log::info;
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Debug)]
struct Ping {
    seq: u64,
}

#[derive(Debug)]
struct Pong {
    seq: u64,
}

#[derive(Debug)]
struct Shutdown {
    pongs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let init_start = Instant::now();
    let (config, _log_guard) = load_config()?;
    let hub = Arc::new(Hub::new());
    let pongs = setup_subscribers(&hub)?;

    let ticker = FlushTicker::new(hub.clone(), config.tick_interval);
    ticker.clone().start()?;
    info!(
        "evhub demo is up in {:.2}s. Press Ctrl+C to stop.",
        init_start.elapsed().as_secs_f64()
    );

    run(&config, &hub).await;

    ticker.clone().stop_and_wait().await?;
    while ticker.tick() > 0 {}

    hub.fire(Shutdown {
        pongs: pongs.load(Ordering::SeqCst),
    });
    info!(
        "Delivered {} events over {} ticks.",
        ticker.delivered(),
        ticker.ticks()
    );
    Ok(())
}

fn load_config() -> Result<(Config, WorkerGuard)> {
    let mut config = Config::new();
    config.load()?;
    let log_guard = setup_logging(&config)?;
    debug!("Loaded configuration: {:?}", config);
    Ok((config, log_guard))
}

fn setup_subscribers(hub: &Arc<Hub>) -> Result<Arc<AtomicU64>> {
    debug!("Setting up subscribers...");

    let weak: Weak<Hub> = Arc::downgrade(hub);
    let on_ping = Handler::new(move |ping: &Ping| {
        debug!("Received ping #{}.", ping.seq);
        if let Some(hub) = weak.upgrade() {
            hub.raise(Pong { seq: ping.seq });
        }
    });

    let pongs = Arc::new(AtomicU64::new(0));
    let counter = pongs.clone();
    let on_pong = Handler::new(move |pong: &Pong| {
        counter.fetch_add(1, Ordering::SeqCst);
        info!("Pong #{} arrived one tick after its ping.", pong.seq);
    });

    let on_shutdown = Handler::new(|shutdown: &Shutdown| {
        info!("Shutting down after {} pongs.", shutdown.pongs);
    });

    hub.subscribe(&on_ping)?;
    hub.subscribe(&on_pong)?;
    hub.subscribe(&on_shutdown)?;
    Ok(pongs)
}

async fn run(config: &Config, hub: &Hub) {
    let mut interval = tokio::time::interval(config.tick_interval);
    let mut seq = 0;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                seq += 1;
                hub.raise(Ping { seq });
                if config.tick_count != 0 && seq >= config.tick_count {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down.");
                break;
            }
        }
    }
}
