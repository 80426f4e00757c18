//! Periodic background worker.
//!
//! # Responsibilities
//! - Do a small unit of work on a fixed interval
//! - Stop the loop and wait for it to exit when drained

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::TickerConfig;
use crate::lifecycle::{ShutdownContext, ShutdownError, Shutdownable};

/// A worker that ticks until it is shut down.
///
/// Owns its own stop token; it is not tied to the lifecycle context and
/// keeps running until the drain reaches it.
pub struct Ticker {
    stop: CancellationToken,
    ticks: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawn the worker loop.
    pub fn start(config: &TickerConfig) -> Self {
        let stop = CancellationToken::new();
        let ticks = Arc::new(AtomicU64::new(0));
        let interval = Duration::from_millis(config.interval_ms);

        tracing::info!(interval_ms = config.interval_ms, "Ticker starting");
        let task = tokio::spawn(run(interval, stop.clone(), ticks.clone()));

        Self {
            stop,
            ticks,
            task: Some(task),
        }
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

async fn run(interval: Duration, stop: CancellationToken, ticks: Arc<AtomicU64>) {
    let mut ticker = time::interval_at(Instant::now() + interval, interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let tick = ticks.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::info!(tick, "Ticker doing periodic work, press Ctrl+C to shut down");
            }
            _ = stop.cancelled() => {
                tracing::info!("Ticker received shutdown signal, exiting loop");
                break;
            }
        }
    }
}

#[async_trait]
impl Shutdownable for Ticker {
    async fn shutdown(&mut self, ctx: &ShutdownContext) -> Result<(), ShutdownError> {
        tracing::info!(ticks = self.ticks(), "Ticker stopping");
        self.stop.cancel();
        match self.task.take() {
            Some(task) => ctx.join(task).await,
            None => Ok(()),
        }
    }
}
