//! HTTP traffic relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────┐
//!                          │                    RELAY                      │
//!     Client Request       │  ┌─────────┐    ┌──────────┐    ┌─────────┐  │
//!     ─────────────────────┼─▶│  http   │───▶│ routing  │───▶│  relay  │  │
//!                          │  │ server  │    │ registry │    │pipeline │  │
//!                          │  └─────────┘    └──────────┘    └────┬────┘  │
//!                          │                                      │       │
//!                          │            ┌─────────────┐           ▼       │
//!                          │            │load_balancer│◀──── pick backend │
//!                          │            │ round robin │           │       │
//!                          │            └─────────────┘           ▼       │
//!     Client Response      │                               ┌───────────┐  │
//!     ◀────────────────────┼───────────────────────────────│  backend  │◀─┼── Backend
//!                          │                               │ transport │  │
//!                          │                               └───────────┘  │
//!                          │  config · observability · resilience ·       │
//!                          │  lifecycle                                   │
//!                          └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use traffic_relay::config::load_config;
use traffic_relay::http::HttpServer;
use traffic_relay::lifecycle::{signals, Shutdown};
use traffic_relay::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "traffic-relay")]
#[command(about = "HTTP reverse relay with round-robin backends", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config/config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    let _log_guard = logging::init_logging(&config.log)?;

    tracing::info!(
        config = %cli.config.display(),
        listen_addr = %config.listener.listen_addr,
        routes = config.routes.len(),
        forward_timeout_secs = config.listener.forward_timeout_secs,
        "traffic-relay v0.1.0 starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let listen_addr = config.listener.listen_addr.clone();
    let throughput_config = config.throughput.clone();

    let server = HttpServer::new(config)?;

    if throughput_config.enabled {
        let sampler = metrics::ThroughputSampler::new(server.throughput(), &throughput_config);
        tokio::spawn(sampler.run(shutdown.subscribe()));
    }

    let listener = TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    tokio::spawn(signals::trigger_on_signal(shutdown.clone()));

    let result = server.run(listener, shutdown.subscribe()).await;
    shutdown.trigger();
    result?;

    tracing::info!("Shutdown complete");
    Ok(())
}
