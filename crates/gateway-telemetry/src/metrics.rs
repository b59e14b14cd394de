//! Prometheus metrics.

use gateway_core::{Capability, ProviderKind};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Gateway metrics, registered on a private registry
#[derive(Debug, Clone)]
pub struct GatewayMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    upstream_duration: HistogramVec,
    token_exchanges: IntCounterVec,
}

impl GatewayMetrics {
    /// Create and register all metrics
    ///
    /// # Errors
    /// Returns error if a metric cannot be registered
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("gateway_requests_total", "Capability requests by outcome"),
            &["capability", "provider", "outcome"],
        )?;

        let upstream_duration = HistogramVec::new(
            HistogramOpts::new(
                "gateway_upstream_duration_seconds",
                "Upstream call duration",
            )
            .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["provider"],
        )?;

        let token_exchanges = IntCounterVec::new(
            Opts::new("gateway_token_exchanges_total", "OAuth token exchanges by outcome"),
            &["outcome"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(upstream_duration.clone()))?;
        registry.register(Box::new(token_exchanges.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            upstream_duration,
            token_exchanges,
        })
    }

    /// Count one finished request
    pub fn record_request(&self, capability: Capability, provider: &str, outcome: &str) {
        self.requests_total
            .with_label_values(&[capability.as_str(), provider, outcome])
            .inc();
    }

    /// Observe one upstream call
    pub fn record_upstream(&self, provider: ProviderKind, elapsed: Duration) {
        self.upstream_duration
            .with_label_values(&[provider.as_str()])
            .observe(elapsed.as_secs_f64());
    }

    /// Count one token exchange
    pub fn record_token_exchange(&self, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.token_exchanges.with_label_values(&[outcome]).inc();
    }

    /// Current value of a request counter
    #[must_use]
    pub fn request_count(&self, capability: Capability, provider: &str, outcome: &str) -> u64 {
        self.requests_total
            .with_label_values(&[capability.as_str(), provider, outcome])
            .get()
    }

    /// Current value of the token exchange counter
    #[must_use]
    pub fn token_exchange_count(&self, success: bool) -> u64 {
        let outcome = if success { "success" } else { "failure" };
        self.token_exchanges.with_label_values(&[outcome]).get()
    }

    /// Render all metrics in the Prometheus text format
    ///
    /// # Errors
    /// Returns error if encoding fails
    pub fn render(&self) -> Result<String, MetricsError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| MetricsError::Encode(e.to_string()))
    }
}

/// Metrics error
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Registration or encoding failed
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
    /// Output was not UTF-8
    #[error("Failed to encode metrics: {0}")]
    Encode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_render() {
        let metrics = GatewayMetrics::new().expect("metrics");
        metrics.record_request(Capability::Chat, "doubao-chat", "ok");
        metrics.record_request(Capability::Chat, "doubao-chat", "ok");
        metrics.record_request(Capability::Speech, "volc-tts", "TEXT_EMPTY");
        metrics.record_upstream(ProviderKind::DoubaoChat, Duration::from_millis(250));
        metrics.record_token_exchange(true);

        assert_eq!(metrics.request_count(Capability::Chat, "doubao-chat", "ok"), 2);

        let text = metrics.render().expect("render");
        assert!(text.contains("gateway_requests_total"));
        assert!(text.contains("outcome=\"TEXT_EMPTY\""));
        assert!(text.contains("gateway_upstream_duration_seconds_bucket"));
        assert!(text.contains("gateway_token_exchanges_total{outcome=\"success\"} 1"));
    }

    #[test]
    fn test_instances_are_independent() {
        let a = GatewayMetrics::new().expect("a");
        let b = GatewayMetrics::new().expect("b");
        a.record_request(Capability::Image, "doubao-image", "ok");
        assert_eq!(b.request_count(Capability::Image, "doubao-image", "ok"), 0);
    }
}
