//! Health report.

use gateway_config::ConfigSummary;
use gateway_core::{Capability, ProviderKind};
use serde::Serialize;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Version
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Registered providers
    pub providers: Vec<ProviderHealth>,
    /// Redacted configuration
    pub config: ConfigSummary,
}

/// One registered provider
#[derive(Debug, Serialize)]
pub struct ProviderHealth {
    /// Provider kind
    pub name: ProviderKind,
    /// Capabilities it serves
    pub capabilities: Vec<Capability>,
    /// Whether its required settings are present
    pub configured: bool,
}

impl HealthResponse {
    /// Build the report from application state
    #[must_use]
    pub fn from_state(state: &AppState) -> Self {
        let registry = state.service.registry();
        let providers = registry
            .kinds()
            .into_iter()
            .filter_map(|kind| registry.get(kind))
            .map(|provider| ProviderHealth {
                name: provider.kind(),
                capabilities: provider.capabilities().to_vec(),
                configured: provider.check_config().is_ok(),
            })
            .collect();

        Self {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
            uptime_seconds: state.uptime_seconds(),
            providers,
            config: state.config.summary(),
        }
    }
}
