//! Enterprise LLM vendor (v2 chat completions).
//!
//! Credentials come from [`QianfanCredential`]. A missing credential is not a
//! configuration error: the request is sent unauthenticated and the vendor's
//! rejection is normalized like any other upstream error.
//!
//! Quota exhaustion is detected by [`QuotaPolicy`] and reported as
//! 429 `QUOTA_EXCEEDED`.

use crate::adapter;
use crate::credential::{
    CredentialProvider, CredentialStore, OAuthTokenExchange, QianfanCredential, TokenExchange,
    BEARER_CREDENTIAL_PREFIX,
};
use crate::normalize::{normalize, QuotaPolicy};
use async_trait::async_trait;
use gateway_config::QianfanSettings;
use gateway_core::{
    Capability, GatewayError, GatewayResponse, GatewayResult, GenerationRequest, Provider,
    ProviderKind, RequestSanitizer, UpstreamRequest, UpstreamResult,
};
use gateway_telemetry::GatewayMetrics;
use reqwest::Client;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{debug, info};

/// Enterprise LLM provider
pub struct QianfanProvider {
    url: String,
    model: String,
    credential: QianfanCredential,
    quota: QuotaPolicy,
    sanitizer: RequestSanitizer,
}

impl QianfanProvider {
    /// Create a provider
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        credential: QianfanCredential,
        quota: QuotaPolicy,
    ) -> Self {
        Self {
            url: url.into(),
            model: model.into(),
            credential,
            quota,
            sanitizer: RequestSanitizer::new(),
        }
    }

    /// Create a provider from configuration.
    ///
    /// An API key carrying the `bce-v3/` prefix is treated as a pre-issued
    /// credential. A pre-fetched access token seeds `store`.
    #[must_use]
    pub fn from_settings(
        settings: &QianfanSettings,
        client: Client,
        store: Arc<CredentialStore>,
        metrics: Option<GatewayMetrics>,
    ) -> Self {
        let bearer = settings.bearer_credential.clone().or_else(|| {
            settings
                .api_key
                .clone()
                .filter(|k| k.expose_secret().starts_with(BEARER_CREDENTIAL_PREFIX))
        });

        let exchange: Option<Arc<dyn TokenExchange>> =
            match (&settings.api_key, &settings.secret_key) {
                (Some(api_key), Some(secret_key)) => Some(Arc::new(OAuthTokenExchange::new(
                    client,
                    settings.auth_url.clone(),
                    api_key.clone(),
                    secret_key.clone(),
                ))),
                _ => None,
            };

        if let Some(token) = &settings.access_token {
            store.seed(token.clone());
        }

        info!(
            bearer = bearer.is_some(),
            exchange = exchange.is_some(),
            access_token = settings.access_token.is_some(),
            "Configured enterprise LLM credentials"
        );

        let mut credential = QianfanCredential::new(bearer, exchange, store);
        if let Some(metrics) = metrics {
            credential = credential.with_metrics(metrics);
        }

        Self::new(
            settings.base_url.clone(),
            settings.model.clone(),
            credential,
            QuotaPolicy::from_settings(&settings.quota),
        )
    }
}

#[async_trait]
impl Provider for QianfanProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Qianfan
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::Chat]
    }

    fn check_config(&self) -> GatewayResult<()> {
        Ok(())
    }

    fn build_request(&self, request: &GenerationRequest) -> GatewayResult<UpstreamRequest> {
        let GenerationRequest::Chat(chat) = request else {
            return Err(GatewayError::UnsupportedCapability {
                provider: self.kind().to_string(),
                capability: request.capability().to_string(),
            });
        };

        let body = adapter::chat_payload(&self.sanitizer, chat, &self.model)?;
        debug!(provider = %self.kind(), url = %self.url, "Built upstream request");
        Ok(UpstreamRequest::post(self.url.clone(), body))
    }

    async fn authorization_header(&self) -> Option<String> {
        self.credential.authorization_header().await
    }

    fn normalize(&self, result: UpstreamResult) -> GatewayResponse {
        normalize(result, Some(&self.quota))
    }
}
