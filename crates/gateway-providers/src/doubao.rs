//! Multimodal vendor (Ark v3 API): chat, image and video tasks.
//!
//! One [`DoubaoProvider`] is registered per capability family, all sharing
//! one [`DoubaoConfig`]:
//! - chat: `POST {base}/chat/completions`
//! - image: `POST {base}/images/generations`
//! - video: `POST {base}/contents/generations/tasks` and
//!   `GET {base}/contents/generations/tasks/{id}`
//!
//! Authentication is a static API key sent as `Bearer <key>`.

use crate::adapter;
use crate::credential::{AuthScheme, CredentialProvider, StaticKeyCredential};
use crate::normalize::normalize;
use async_trait::async_trait;
use gateway_config::DoubaoSettings;
use gateway_core::{
    Capability, GatewayError, GatewayResponse, GatewayResult, GenerationRequest, Provider,
    ProviderKind, RequestSanitizer, UpstreamRequest, UpstreamResult,
};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::debug;

/// Setting reported when the API key is absent
pub const API_KEY_SETTING: &str = "DOUBAO_API_KEY";

/// Multimodal vendor configuration
#[derive(Debug, Clone)]
pub struct DoubaoConfig {
    /// API base, without trailing slash
    pub base_url: String,
    /// API key
    pub api_key: Option<SecretString>,
    /// Default chat model
    pub chat_model: String,
    /// Default image model
    pub image_model: String,
    /// Default video model
    pub video_model: String,
}

impl DoubaoConfig {
    /// Create a configuration with default endpoints and models
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::new(api_key.into())),
            ..Self::from(&DoubaoSettings::default())
        }
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

impl From<&DoubaoSettings> for DoubaoConfig {
    fn from(settings: &DoubaoSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            chat_model: settings.chat_model.clone(),
            image_model: settings.image_model.clone(),
            video_model: settings.video_model.clone(),
        }
    }
}

/// One capability family of the multimodal vendor
pub struct DoubaoProvider {
    kind: ProviderKind,
    config: Arc<DoubaoConfig>,
    credential: StaticKeyCredential,
    sanitizer: RequestSanitizer,
}

impl DoubaoProvider {
    fn new(kind: ProviderKind, config: Arc<DoubaoConfig>) -> Self {
        let credential = StaticKeyCredential::new(config.api_key.clone(), AuthScheme::Bearer);
        Self {
            kind,
            config,
            credential,
            sanitizer: RequestSanitizer::new(),
        }
    }

    /// Chat completions
    #[must_use]
    pub fn chat(config: Arc<DoubaoConfig>) -> Self {
        Self::new(ProviderKind::DoubaoChat, config)
    }

    /// Image generation
    #[must_use]
    pub fn image(config: Arc<DoubaoConfig>) -> Self {
        Self::new(ProviderKind::DoubaoImage, config)
    }

    /// Video task creation and status
    #[must_use]
    pub fn video(config: Arc<DoubaoConfig>) -> Self {
        Self::new(ProviderKind::DoubaoVideo, config)
    }

    /// All three families over one configuration
    #[must_use]
    pub fn all(config: DoubaoConfig) -> Vec<Self> {
        let config = Arc::new(config);
        vec![
            Self::chat(Arc::clone(&config)),
            Self::image(Arc::clone(&config)),
            Self::video(config),
        ]
    }
}

#[async_trait]
impl Provider for DoubaoProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn capabilities(&self) -> &[Capability] {
        match self.kind {
            ProviderKind::DoubaoChat => &[Capability::Chat],
            ProviderKind::DoubaoImage => &[Capability::Image],
            ProviderKind::DoubaoVideo => &[Capability::VideoCreate, Capability::VideoStatus],
            ProviderKind::Qianfan | ProviderKind::VolcTts => &[],
        }
    }

    fn check_config(&self) -> GatewayResult<()> {
        if self.credential.is_configured() {
            Ok(())
        } else {
            Err(GatewayError::config_missing(API_KEY_SETTING))
        }
    }

    fn build_request(&self, request: &GenerationRequest) -> GatewayResult<UpstreamRequest> {
        let s = &self.sanitizer;
        let config = &self.config;
        let upstream = match (self.kind, request) {
            (ProviderKind::DoubaoChat, GenerationRequest::Chat(r)) => UpstreamRequest::post(
                config.endpoint("chat/completions"),
                adapter::chat_payload(s, r, &config.chat_model)?,
            ),
            (ProviderKind::DoubaoImage, GenerationRequest::Image(r)) => UpstreamRequest::post(
                config.endpoint("images/generations"),
                adapter::image_payload(s, r, &config.image_model)?,
            ),
            (ProviderKind::DoubaoVideo, GenerationRequest::VideoCreate(r)) => {
                UpstreamRequest::post(
                    config.endpoint("contents/generations/tasks"),
                    adapter::video_payload(s, r, &config.video_model)?,
                )
            }
            (ProviderKind::DoubaoVideo, GenerationRequest::VideoStatus(r)) => UpstreamRequest::get(
                adapter::video_status_url(s, &config.endpoint("contents/generations/tasks"), r)?,
            ),
            (kind, other) => {
                return Err(GatewayError::UnsupportedCapability {
                    provider: kind.to_string(),
                    capability: other.capability().to_string(),
                })
            }
        };

        debug!(provider = %self.kind, url = %upstream.url, "Built upstream request");
        Ok(upstream)
    }

    async fn authorization_header(&self) -> Option<String> {
        self.credential.authorization_header().await
    }

    fn normalize(&self, result: UpstreamResult) -> GatewayResponse {
        normalize(result, None)
    }
}
