//! Graceful application demo.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                        LIFECYCLE                              │
//!   │                                                               │
//!   │  signals ──┐                                                  │
//!   │            ├─▶ controller ──▶ coordinator ──▶ report + exit   │
//!   │  cancel() ─┘        │               │                         │
//!   │                     ▼               ▼                         │
//!   │              startup callback   Shutdownable capabilities     │
//!   │                     │            (in registration order)      │
//!   │                     ├─▶ worker::Ticker                        │
//!   │                     └─▶ http::WebServer                       │
//!   └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Run it, open http://127.0.0.1:8080/ and press Ctrl+C while the request is
//! in flight to watch both subsystems stop within the shutdown deadline.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use graceful_app::config::loader::read_config;
use graceful_app::config::validation::validate_config;
use graceful_app::config::{AppConfig, ColorMode};
use graceful_app::http::WebServer;
use graceful_app::lifecycle::{Capabilities, Lifecycle, Shutdownable};
use graceful_app::observability::{logging, metrics};
use graceful_app::worker::Ticker;

#[derive(Parser)]
#[command(name = "graceful-app")]
#[command(about = "Demo application with graceful, deadline-bound shutdown", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Color the lifecycle report.
    #[arg(long, value_enum)]
    color: Option<ColorMode>,

    /// Shutdown deadline in seconds.
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Web server bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(color) = self.color {
            config.lifecycle.color = color;
        }
        if let Some(timeout) = self.timeout {
            config.lifecycle.shutdown_timeout_secs = timeout;
        }
        if let Some(bind) = &self.bind {
            config.server.bind_address = bind.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => AppConfig::default(),
    };
    cli.apply(&mut config);
    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            eprintln!("invalid configuration: {error}");
        }
        return Ok(ExitCode::from(2));
    }

    logging::init_logging(&config.observability)?;
    tracing::info!("graceful-app v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let report = Lifecycle::new(&config.lifecycle)
        .run(|ctx, cancel| -> Capabilities {
            let ticker = Ticker::start(&config.ticker);
            let server = WebServer::start(&config.server, ctx, cancel);
            vec![
                Box::new(ticker) as Box<dyn Shutdownable>,
                Box::new(server),
            ]
        })
        .await;

    Ok(ExitCode::from(&report))
}
