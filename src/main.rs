//! Bilibili API relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                 BILI-RELAY                   │
//!   Browser / CLI         │                                              │
//!   ──────────────────────┼─▶ cors ─▶ request-id ─▶ dispatch             │
//!                         │                           │                  │
//!                         │              ┌────────────┴───────────┐      │
//!                         │              ▼                        ▼      │
//!                         │        route table               open relay  │
//!                         │     (plan + defaults)         (allow-listed) │
//!                         │              │                        │      │
//!                         │              ▼                        ▼      │
//!                         │        upstream client (headers, cookie)     │
//!                         └──────────────────────┬───────────────────────┘
//!                                                ▼
//!                                  api / passport / CDN upstream
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use bili_relay::config::{load_config, RelayConfig};
use bili_relay::lifecycle::{signals, Shutdown};
use bili_relay::observability::{logging, metrics};
use bili_relay::HttpServer;

#[derive(Parser)]
#[command(name = "bili-relay")]
#[command(about = "CORS relay for the Bilibili web API", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!("bili-relay v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        api_base = %config.upstream.api_base,
        relay_enabled = config.relay.enabled,
        allowed_hosts = ?config.relay.allowed_hosts,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
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

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::forward_to(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
