//! Configuration schema.

use crate::error::{ConfigError, ConfigResult};
use gateway_core::{Capability, Vendor};
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Default multimodal vendor API base
pub const DEFAULT_DOUBAO_BASE_URL: &str = "https://ark.cn-beijing.volces.com/api/v3";
/// Default enterprise LLM chat endpoint
pub const DEFAULT_QIANFAN_BASE_URL: &str = "https://qianfan.baidubce.com/v2/chat/completions";
/// Default OAuth token endpoint for the API-key/secret exchange
pub const DEFAULT_QIANFAN_AUTH_URL: &str = "https://aip.baidubce.com/oauth/2.0/token";
/// Default speech synthesis endpoint
pub const DEFAULT_TTS_URL: &str = "https://openspeech.bytedance.com/api/v1/tts";

/// Root gateway configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP listener
    pub server: ServerSettings,
    /// Cross-origin policy
    pub cors: CorsSettings,
    /// Outbound HTTP client
    pub upstream: UpstreamSettings,
    /// Multimodal chat/image/video vendor
    pub doubao: DoubaoSettings,
    /// Enterprise LLM vendor
    pub qianfan: QianfanSettings,
    /// Speech vendor
    pub tts: TtsSettings,
    /// Log output
    pub logging: LoggingSettings,
    /// Vendor used by the provider-less routes
    pub default_providers: DefaultProviders,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// How long in-flight requests may run after a shutdown signal
    #[serde(with = "humantime_serde")]
    pub shutdown_grace: Duration,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_grace: Duration::from_secs(10),
        }
    }
}

/// CORS settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsSettings {
    /// Value of `Access-Control-Allow-Origin`
    pub allow_origin: String,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
        }
    }
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    /// Per-call timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
        }
    }
}

/// Multimodal vendor settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DoubaoSettings {
    /// API base, without trailing slash
    pub base_url: String,
    /// Bearer API key
    pub api_key: Option<SecretString>,
    /// Default chat model
    pub chat_model: String,
    /// Default image model
    pub image_model: String,
    /// Default video model
    pub video_model: String,
}

impl Default for DoubaoSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DOUBAO_BASE_URL.to_string(),
            api_key: None,
            chat_model: "doubao-seed-1-6-250615".to_string(),
            image_model: "doubao-seedream-3-0-t2i-250415".to_string(),
            video_model: "doubao-seedance-1-0-pro-250528".to_string(),
        }
    }
}

/// Enterprise LLM vendor settings.
///
/// Credentials are tried in order: `bearer_credential`, then the cached or
/// exchanged token from `api_key` + `secret_key`, seeded by `access_token`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QianfanSettings {
    /// Chat completions endpoint
    pub base_url: String,
    /// OAuth token endpoint
    pub auth_url: String,
    /// Pre-issued credential (`bce-v3/...`)
    pub bearer_credential: Option<SecretString>,
    /// Exchange client id
    pub api_key: Option<SecretString>,
    /// Exchange client secret
    pub secret_key: Option<SecretString>,
    /// Pre-fetched access token
    pub access_token: Option<SecretString>,
    /// Default model
    pub model: String,
    /// Quota detection
    pub quota: QuotaSettings,
}

impl Default for QianfanSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_QIANFAN_BASE_URL.to_string(),
            auth_url: DEFAULT_QIANFAN_AUTH_URL.to_string(),
            bearer_credential: None,
            api_key: None,
            secret_key: None,
            access_token: None,
            model: "ernie-4.0-8k".to_string(),
            quota: QuotaSettings::default(),
        }
    }
}

/// Indicators that an upstream error means quota exhaustion
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuotaSettings {
    /// Case-insensitive substrings of the error message
    pub phrases: Vec<String>,
    /// Numeric provider error codes
    pub codes: Vec<i64>,
}

impl Default for QuotaSettings {
    fn default() -> Self {
        Self {
            phrases: vec!["quota exceeded".to_string(), "额度不足".to_string()],
            codes: vec![4001],
        }
    }
}

/// Speech vendor settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TtsSettings {
    /// Synthesis endpoint
    pub url: String,
    /// Access token, sent as `Bearer;<token>`
    pub api_key: Option<SecretString>,
    /// Voice used when the caller names none
    pub default_voice: String,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_TTS_URL.to_string(),
            api_key: None,
            default_voice: "female".to_string(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Vendor serving each capability on the `/api/<capability>` routes
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct DefaultProviders {
    /// Chat
    pub chat: Vendor,
    /// Image
    pub image: Vendor,
    /// Video create and status
    pub video: Vendor,
    /// Speech
    pub speech: Vendor,
}

impl Default for DefaultProviders {
    fn default() -> Self {
        Self {
            chat: Vendor::Doubao,
            image: Vendor::Doubao,
            video: Vendor::Doubao,
            speech: Vendor::VolcTts,
        }
    }
}

impl DefaultProviders {
    /// Default vendor for `capability`
    #[must_use]
    pub fn for_capability(&self, capability: Capability) -> Vendor {
        match capability {
            Capability::Chat => self.chat,
            Capability::Image => self.image,
            Capability::VideoCreate | Capability::VideoStatus => self.video,
            Capability::Speech => self.speech,
        }
    }
}

impl GatewayConfig {
    /// Reject settings the gateway cannot start with.
    ///
    /// Missing secrets are not errors here; they surface per request.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port", "must be non-zero"));
        }
        if self.upstream.timeout.is_zero() {
            return Err(ConfigError::invalid("upstream.timeout", "must be non-zero"));
        }

        for (field, value) in [
            ("doubao.base_url", &self.doubao.base_url),
            ("qianfan.base_url", &self.qianfan.base_url),
            ("qianfan.auth_url", &self.qianfan.auth_url),
            ("tts.url", &self.tts.url),
        ] {
            validate_http_url(field, value)?;
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::invalid(
                "logging.format",
                format!("expected pretty or json, got {}", self.logging.format),
            ));
        }

        Ok(())
    }

    /// Redacted view of this configuration
    #[must_use]
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            listen: format!("{}:{}", self.server.host, self.server.port),
            doubao_base_url: self.doubao.base_url.clone(),
            doubao_api_key: self.doubao.api_key.is_some(),
            qianfan_base_url: self.qianfan.base_url.clone(),
            qianfan_credential: self.qianfan_credential_source(),
            tts_url: self.tts.url.clone(),
            tts_api_key: self.tts.api_key.is_some(),
            cors_allow_origin: self.cors.allow_origin.clone(),
        }
    }

    fn qianfan_credential_source(&self) -> &'static str {
        let q = &self.qianfan;
        if q.bearer_credential.is_some() {
            "bearer"
        } else if q.api_key.is_some() && q.secret_key.is_some() {
            "exchange"
        } else if q.access_token.is_some() {
            "access-token"
        } else {
            "none"
        }
    }
}

fn validate_http_url(field: &str, value: &str) -> ConfigResult<()> {
    let url = Url::parse(value).map_err(|e| ConfigError::invalid(field, e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            field,
            format!("unsupported scheme {}", url.scheme()),
        ));
    }
    Ok(())
}

/// Configuration with every secret replaced by a presence flag
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ConfigSummary {
    /// `host:port`
    pub listen: String,
    /// Multimodal vendor base
    pub doubao_base_url: String,
    /// Whether the multimodal API key is set
    pub doubao_api_key: bool,
    /// Enterprise LLM endpoint
    pub qianfan_base_url: String,
    /// Which enterprise LLM credential strategy applies
    pub qianfan_credential: &'static str,
    /// Speech endpoint
    pub tts_url: String,
    /// Whether the speech token is set
    pub tts_api_key: bool,
    /// CORS origin
    pub cors_allow_origin: String,
}
