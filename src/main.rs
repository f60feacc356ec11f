//! Locale gatekeeper server.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ trace ─▶ timeout ─▶ gatekeeper ─▶ page handler
//!                                                          │
//!     ◀──────────────── 307 redirect (locale / auth error) ┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use locale_gatekeeper::config::{load_config, load_from_env};
use locale_gatekeeper::http::HttpServer;
use locale_gatekeeper::lifecycle::{signals, Shutdown};
use locale_gatekeeper::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "locale-gatekeeper")]
#[command(about = "Locale and security gatekeeper for a localized web app", long_about = None)]
struct Args {
    /// Path to the TOML config file. Defaults plus GATEKEEPER_* overrides when absent.
    #[arg(short, long, env = "GATEKEEPER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };

    logging::init_logging(&config.observability, config.environment)?;

    tracing::info!("locale-gatekeeper v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?config.environment,
        bind_address = %config.listener.bind_address,
        locales = ?config.locales.supported,
        default_locale = %config.locales.default,
        max_login_attempts = config.rate_limit.max_attempts,
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
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
