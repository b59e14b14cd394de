//! The request pipeline shared by every capability endpoint.

use crate::invoker::UpstreamInvoker;
use crate::registry::ProviderRegistry;
use gateway_config::GatewayConfig;
use gateway_core::{
    Capability, GatewayError, GatewayResponse, GatewayResult, GenerationRequest, Vendor,
};
use gateway_telemetry::GatewayMetrics;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn, Span};

/// Resolves a provider and runs one request through it.
///
/// Order: resolve, configuration check, adapt and validate, credentials,
/// one upstream call, normalize. Every failure becomes an envelope.
#[derive(Clone)]
pub struct GatewayService {
    registry: Arc<ProviderRegistry>,
    invoker: UpstreamInvoker,
    metrics: Option<GatewayMetrics>,
}

impl GatewayService {
    /// Create a service
    #[must_use]
    pub fn new(registry: Arc<ProviderRegistry>, invoker: UpstreamInvoker) -> Self {
        Self {
            registry,
            invoker,
            metrics: None,
        }
    }

    /// Record request metrics
    #[must_use]
    pub fn with_metrics(mut self, metrics: GatewayMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the invoker and registry from configuration
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn from_config(
        config: &GatewayConfig,
        metrics: Option<GatewayMetrics>,
    ) -> GatewayResult<Self> {
        let invoker = UpstreamInvoker::new(config.upstream.timeout)?;
        let registry =
            ProviderRegistry::from_config(config, invoker.client().clone(), metrics.clone());

        info!(
            providers = registry.len(),
            timeout_secs = config.upstream.timeout.as_secs(),
            "Provider registry initialized"
        );

        let service = Self::new(Arc::new(registry), invoker);
        Ok(match metrics {
            Some(metrics) => service.with_metrics(metrics),
            None => service,
        })
    }

    /// Provider registry
    #[must_use]
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Handle an inbound JSON body for `capability`
    pub async fn handle(
        &self,
        capability: Capability,
        vendor: Option<Vendor>,
        body: &Value,
        task_id: Option<&str>,
    ) -> GatewayResponse {
        let request = GenerationRequest::from_body(capability, body, task_id);
        self.execute(request, vendor).await
    }

    /// Run a typed request through the pipeline
    #[instrument(
        name = "gateway.execute",
        skip_all,
        fields(capability = %request.capability(), provider = tracing::field::Empty)
    )]
    pub async fn execute(&self, request: GenerationRequest, vendor: Option<Vendor>) -> GatewayResponse {
        let capability = request.capability();
        let start = Instant::now();

        let (provider_label, response) = match self.run(&request, vendor).await {
            Ok(result) => result,
            Err((label, error)) => {
                debug!(error = %error, "Request rejected before upstream call");
                (label, GatewayResponse::from(error))
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_request(capability, &provider_label, response.outcome());
        }

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        if response.ok {
            info!(status = response.status, duration_ms, "Request completed");
        } else {
            warn!(
                status = response.status,
                error = %response.outcome(),
                duration_ms,
                "Request failed"
            );
        }

        response
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        vendor: Option<Vendor>,
    ) -> Result<(String, GatewayResponse), (String, GatewayError)> {
        let capability = request.capability();
        let unresolved = || vendor.map_or_else(|| "default".to_string(), |v| v.to_string());

        let provider = self
            .registry
            .resolve(capability, vendor)
            .map_err(|e| (unresolved(), e))?;
        let kind = provider.kind();
        let label = kind.to_string();
        Span::current().record("provider", label.as_str());

        provider.check_config().map_err(|e| (label.clone(), e))?;
        let upstream = provider
            .build_request(request)
            .map_err(|e| (label.clone(), e))?;
        let authorization = provider.authorization_header().await;

        let start = Instant::now();
        let result = self
            .invoker
            .invoke(&upstream, authorization.as_deref())
            .await;
        if let Some(metrics) = &self.metrics {
            metrics.record_upstream(kind, start.elapsed());
        }

        let result = result.map_err(|e| (label.clone(), e))?;
        debug!(upstream_status = result.status, body_kind = result.body.kind(), "Normalizing");
        Ok((label, provider.normalize(result)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_config::GatewayConfig;
    use gateway_core::ErrorCode;
    use secrecy::SecretString;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.doubao.base_url = format!("{}/api/v3", server.uri());
        config.doubao.api_key = Some(SecretString::new("ark-key".to_string()));
        config.qianfan.base_url = format!("{}/v2/chat/completions", server.uri());
        config.qianfan.auth_url = format!("{}/oauth/2.0/token", server.uri());
        config.tts.url = format!("{}/api/v1/tts", server.uri());
        config.tts.api_key = Some(SecretString::new("tts-token".to_string()));
        config.upstream.timeout = Duration::from_secs(5);
        config
    }

    fn service(config: &GatewayConfig) -> GatewayService {
        GatewayService::from_config(config, Some(GatewayMetrics::new().expect("metrics")))
            .expect("service")
    }

    #[tokio::test]
    async fn test_chat_strips_backticks_end_to_end() {
        let server = MockServer::start().await;
        let upstream_body = json!({"id": "chat-1", "choices": [{"message": {"content": "hello"}}]});
        Mock::given(method("POST"))
            .and(path("/api/v3/chat/completions"))
            .and(header("authorization", "Bearer ark-key"))
            .and(body_partial_json(json!({
                "messages": [{"role": "user", "content": [{"type": "text", "text": "hi"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let response = service(&config(&server))
            .handle(
                Capability::Chat,
                None,
                &json!({"messages": [{"role": "user", "content": [{"type": "text", "text": "`hi`"}]}]}),
                None,
            )
            .await;

        assert!(response.ok);
        assert_eq!(response.status, 200);
        assert_eq!(response.data, Some(upstream_body));
    }

    #[tokio::test]
    async fn test_validation_makes_no_upstream_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let service = service(&config(&server));
        let cases = [
            (Capability::Chat, json!({}), ErrorCode::MessagesRequired),
            (Capability::Image, json!({"size": "1x1"}), ErrorCode::PromptRequired),
            (Capability::VideoCreate, json!({"content": []}), ErrorCode::ContentRequired),
            (Capability::Speech, json!({"text": " "}), ErrorCode::TextEmpty),
        ];
        for (capability, body, code) in cases {
            let response = service.handle(capability, None, &body, None).await;
            assert_eq!(response.status, 400, "{capability}");
            assert_eq!(response.error, Some(code));
        }

        let response = service
            .handle(Capability::VideoStatus, None, &Value::Null, Some(""))
            .await;
        assert_eq!(response.error, Some(ErrorCode::IdRequired));
    }

    #[tokio::test]
    async fn test_config_missing_before_validation() {
        let server = MockServer::start().await;
        let mut config = config(&server);
        config.doubao.api_key = None;

        let response = service(&config)
            .handle(Capability::Image, None, &json!({}), None)
            .await;
        assert_eq!(response.status, 500);
        assert_eq!(response.error, Some(ErrorCode::ConfigMissing));
        assert!(server.received_requests().await.expect("recorded").is_empty());
    }

    #[tokio::test]
    async fn test_speech_audio_is_base64() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/tts"))
            .and(header("authorization", "Bearer;tts-token"))
            .and(body_partial_json(json!({"text": "hello", "voice": "female", "audio_format": "mp3"})))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"ID3".to_vec(), "audio/mpeg"))
            .expect(1)
            .mount(&server)
            .await;

        let response = service(&config(&server))
            .handle(Capability::Speech, None, &json!({"text": " `hello` "}), None)
            .await;
        assert!(response.ok);
        assert_eq!(response.audio_base64.as_deref(), Some("SUQz"));
        assert_eq!(response.content_type.as_deref(), Some("audio/mpeg"));
    }

    #[tokio::test]
    async fn test_network_failure_is_server_error() {
        let mut config = GatewayConfig::default();
        config.doubao.base_url = "http://127.0.0.1:1/api/v3".to_string();
        config.doubao.api_key = Some(SecretString::new("k".to_string()));
        config.upstream.timeout = Duration::from_secs(2);

        let response = service(&config)
            .handle(Capability::Image, None, &json!({"prompt": "fox"}), None)
            .await;
        assert_eq!(response.status, 500);
        assert_eq!(response.error, Some(ErrorCode::ServerError));
        assert!(response.message.is_some());
    }

    #[tokio::test]
    async fn test_qianfan_quota_maps_to_429() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": "quota_limit", "message": "Quota exceeded for this account"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = service(&config(&server))
            .handle(
                Capability::Chat,
                Some(Vendor::Qianfan),
                &json!({"messages": [{"content": "hi"}]}),
                None,
            )
            .await;
        assert_eq!(response.status, 429);
        assert_eq!(response.error, Some(ErrorCode::QuotaExceeded));
    }

    #[tokio::test]
    async fn test_metrics_recorded() {
        let server = MockServer::start().await;
        let metrics = GatewayMetrics::new().expect("metrics");
        let service = GatewayService::from_config(&config(&server), Some(metrics.clone()))
            .expect("service");

        service.handle(Capability::Image, None, &json!({}), None).await;
        assert_eq!(
            metrics.request_count(Capability::Image, "doubao-image", "PROMPT_REQUIRED"),
            1
        );
    }
}
