//! Shared application state.

use gateway_config::GatewayConfig;
use gateway_core::GatewayError;
use gateway_providers::GatewayService;
use gateway_telemetry::GatewayMetrics;
use std::sync::Arc;
use std::time::Instant;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Request pipeline
    pub service: GatewayService,
    /// Loaded configuration
    pub config: Arc<GatewayConfig>,
    /// Prometheus metrics
    pub metrics: GatewayMetrics,
    /// Process start time
    pub started_at: Instant,
}

impl AppState {
    /// Create a builder
    #[must_use]
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::default()
    }

    /// Seconds since start-up
    #[must_use]
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Builder for [`AppState`]
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<GatewayConfig>,
    metrics: Option<GatewayMetrics>,
    service: Option<GatewayService>,
}

impl AppStateBuilder {
    /// Set the configuration
    #[must_use]
    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the metrics
    #[must_use]
    pub fn metrics(mut self, metrics: GatewayMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Set the service; by default it is built from the configuration
    #[must_use]
    pub fn service(mut self, service: GatewayService) -> Self {
        self.service = Some(service);
        self
    }

    /// Build the state
    ///
    /// # Errors
    /// Returns error if metrics or the HTTP client cannot be created
    pub fn build(self) -> Result<AppState, GatewayError> {
        let config = self.config.unwrap_or_default();
        let metrics = match self.metrics {
            Some(metrics) => metrics,
            None => GatewayMetrics::new().map_err(|e| GatewayError::internal(e.to_string()))?,
        };
        let service = match self.service {
            Some(service) => service,
            None => GatewayService::from_config(&config, Some(metrics.clone()))?,
        };

        Ok(AppState {
            service,
            config: Arc::new(config),
            metrics,
            started_at: Instant::now(),
        })
    }
}
