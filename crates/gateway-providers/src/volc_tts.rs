//! Speech synthesis vendor.
//!
//! Wire body: `{text, voice, speed, pitch, audio_format}`. Successful calls
//! return `audio/*` bytes, relayed to the caller as base64. Authentication is
//! `Authorization: Bearer;<token>`.

use crate::adapter;
use crate::credential::{AuthScheme, CredentialProvider, StaticKeyCredential};
use crate::normalize::normalize;
use async_trait::async_trait;
use gateway_config::TtsSettings;
use gateway_core::{
    Capability, GatewayError, GatewayResponse, GatewayResult, GenerationRequest, Provider,
    ProviderKind, RequestSanitizer, UpstreamRequest, UpstreamResult,
};
use secrecy::SecretString;

/// Setting reported when the token is absent
pub const TOKEN_SETTING: &str = "VOLC_TTS_TOKEN";

/// Speech provider
pub struct VolcTtsProvider {
    url: String,
    default_voice: String,
    credential: StaticKeyCredential,
    sanitizer: RequestSanitizer,
}

impl VolcTtsProvider {
    /// Create a provider
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        token: Option<SecretString>,
        default_voice: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            default_voice: default_voice.into(),
            credential: StaticKeyCredential::new(token, AuthScheme::BearerSemicolon),
            sanitizer: RequestSanitizer::new(),
        }
    }

    /// Create a provider from configuration
    #[must_use]
    pub fn from_settings(settings: &TtsSettings) -> Self {
        Self::new(
            settings.url.clone(),
            settings.api_key.clone(),
            settings.default_voice.clone(),
        )
    }
}

#[async_trait]
impl Provider for VolcTtsProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::VolcTts
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::Speech]
    }

    fn check_config(&self) -> GatewayResult<()> {
        if self.credential.is_configured() {
            Ok(())
        } else {
            Err(GatewayError::config_missing(TOKEN_SETTING))
        }
    }

    fn build_request(&self, request: &GenerationRequest) -> GatewayResult<UpstreamRequest> {
        let GenerationRequest::Speech(speech) = request else {
            return Err(GatewayError::UnsupportedCapability {
                provider: self.kind().to_string(),
                capability: request.capability().to_string(),
            });
        };

        let body = adapter::speech_payload(&self.sanitizer, speech, &self.default_voice)?;
        Ok(UpstreamRequest::post(self.url.clone(), body))
    }

    async fn authorization_header(&self) -> Option<String> {
        self.credential.authorization_header().await
    }

    fn normalize(&self, result: UpstreamResult) -> GatewayResponse {
        normalize(result, None)
    }
}
