//! Capability and provider lookup.

use crate::credential::CredentialStore;
use crate::doubao::{DoubaoConfig, DoubaoProvider};
use crate::qianfan::QianfanProvider;
use crate::volc_tts::VolcTtsProvider;
use gateway_config::{DefaultProviders, GatewayConfig};
use gateway_core::{Capability, GatewayError, GatewayResult, Provider, ProviderKind, Vendor};
use gateway_telemetry::GatewayMetrics;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;

/// Providers keyed by kind, plus the vendor serving each capability by default.
///
/// Built once at start-up and read-only afterwards.
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn Provider>>,
    defaults: DefaultProviders,
}

impl ProviderRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new(defaults: DefaultProviders) -> Self {
        Self {
            providers: HashMap::new(),
            defaults,
        }
    }

    /// Register every provider from configuration.
    ///
    /// `client` is shared with the credential exchange. Providers are
    /// registered even when their secrets are missing so that requests can
    /// report `CONFIG_MISSING`.
    #[must_use]
    pub fn from_config(
        config: &GatewayConfig,
        client: Client,
        metrics: Option<GatewayMetrics>,
    ) -> Self {
        let mut registry = Self::new(config.default_providers);

        for provider in DoubaoProvider::all(DoubaoConfig::from(&config.doubao)) {
            registry.register(Arc::new(provider));
        }

        let store = Arc::new(CredentialStore::default());
        registry.register(Arc::new(QianfanProvider::from_settings(
            &config.qianfan,
            client,
            store,
            metrics,
        )));

        registry.register(Arc::new(VolcTtsProvider::from_settings(&config.tts)));
        registry
    }

    /// Add or replace a provider
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.kind(), provider);
    }

    /// Provider by kind
    #[must_use]
    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn Provider>> {
        self.providers.get(&kind).cloned()
    }

    /// Provider serving `capability` for `vendor`, or for the configured
    /// default vendor when `vendor` is `None`
    pub fn resolve(
        &self,
        capability: Capability,
        vendor: Option<Vendor>,
    ) -> GatewayResult<Arc<dyn Provider>> {
        let vendor = vendor.unwrap_or_else(|| self.defaults.for_capability(capability));
        self.providers
            .values()
            .find(|p| p.kind().vendor() == vendor && p.supports(capability))
            .cloned()
            .ok_or_else(|| GatewayError::UnsupportedCapability {
                provider: vendor.to_string(),
                capability: capability.to_string(),
            })
    }

    /// Registered provider kinds
    #[must_use]
    pub fn kinds(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<_> = self.providers.keys().copied().collect();
        kinds.sort_by_key(|k| k.as_str());
        kinds
    }

    /// Number of registered providers
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no provider is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
