//! HTTP server lifecycle.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use gateway_config::GatewayConfig;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::routes::create_router;
use crate::shutdown::shutdown_signal;
use crate::state::AppState;

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listen address could not be parsed
    #[error("Invalid listen address {address}: {source}")]
    Address {
        /// Offending address
        address: String,
        /// Parse error
        source: std::net::AddrParseError,
    },
    /// Binding or serving failed
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Listener settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub addr: SocketAddr,
    /// Time allowed for in-flight requests after a shutdown signal
    pub shutdown_grace: Duration,
}

impl ServerConfig {
    /// Read listener settings from the gateway configuration
    ///
    /// # Errors
    /// Returns error if host and port do not form a socket address
    pub fn from_gateway_config(config: &GatewayConfig) -> Result<Self, ServerError> {
        let address = format!("{}:{}", config.server.host, config.server.port);
        let addr = address
            .parse()
            .map_err(|source| ServerError::Address { address, source })?;
        Ok(Self {
            addr,
            shutdown_grace: config.server.shutdown_grace,
        })
    }
}

/// The gateway HTTP server
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Create a server
    #[must_use]
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Bind and serve until a shutdown signal arrives
    ///
    /// # Errors
    /// Returns error if the address cannot be bound or serving fails
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.config.addr).await?;
        info!(addr = %self.config.addr, "Gateway listening");

        let grace = self.config.shutdown_grace;
        serve(listener, self.state, async move {
            shutdown_signal().await;
            // Bound the drain: exit even if connections linger.
            tokio::spawn(async move {
                tokio::time::sleep(grace).await;
                warn!(grace_secs = grace.as_secs(), "Shutdown grace period elapsed, exiting");
                std::process::exit(0);
            });
        })
        .await
    }
}

/// Serve the gateway on `listener` until `shutdown` completes
///
/// # Errors
/// Returns error if serving fails
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Gateway stopped");
    Ok(())
}
