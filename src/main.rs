//! # Generation Gateway
//!
//! HTTP gateway in front of chat, image, video and speech generation vendors.
//!
//! ## Features
//!
//! - One JSON envelope for every capability and vendor
//! - Request sanitizing and local validation before any upstream call
//! - Vendor credential handling, including cached OAuth token exchange
//! - Prometheus metrics and structured logging
//!
//! ## Usage
//!
//! ```bash
//! # Start with defaults and environment credentials
//! ARK_API_KEY=... generation-gateway
//!
//! # Start with a config file
//! GATEWAY_CONFIG=/etc/gateway/config.yaml generation-gateway
//!
//! # Override the port
//! GATEWAY_PORT=9000 generation-gateway
//! ```

use anyhow::Context;
use gateway_config::{load_config, GatewayConfig};
use gateway_core::Provider;
use gateway_server::{AppState, Server, ServerConfig};
use gateway_telemetry::{init_logging, LogFormat, LoggingConfig};
use tracing::{error, info, warn};

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = format!("{e:#}"), "Application failed");
        eprintln!("generation-gateway: {e:#}");
        std::process::exit(1);
    }
}

/// Main application logic
async fn run() -> anyhow::Result<()> {
    let config = load_config().await.context("loading configuration")?;
    init_logging(&logging_config(&config)).context("initializing logging")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting generation gateway"
    );

    let state = AppState::builder()
        .config(config.clone())
        .build()
        .context("building application state")?;

    let registry = state.service.registry();
    for provider in registry.kinds().into_iter().filter_map(|kind| registry.get(kind)) {
        if let Err(e) = provider.check_config() {
            warn!(
                provider = %provider.kind(),
                error = %e,
                "Provider is not configured; its requests will fail with CONFIG_MISSING"
            );
        }
    }

    let server_config = ServerConfig::from_gateway_config(&config)?;
    Server::new(server_config, state).run().await?;

    Ok(())
}

/// Map the configured log settings onto the telemetry logger
fn logging_config(config: &GatewayConfig) -> LoggingConfig {
    let format = config.logging.format.parse().unwrap_or_else(|_| {
        eprintln!(
            "unknown log format {:?}, using pretty",
            config.logging.format
        );
        LogFormat::Pretty
    });
    LoggingConfig::new()
        .with_level(&config.logging.level)
        .with_format(format)
}
