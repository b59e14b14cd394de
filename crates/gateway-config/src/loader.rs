//! Loading configuration from a YAML file and the environment.

use crate::error::{ConfigError, ConfigResult};
use crate::model::GatewayConfig;
use gateway_core::Vendor;
use secrecy::SecretString;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Variable naming an optional YAML configuration file
pub const CONFIG_PATH_ENV: &str = "GATEWAY_CONFIG";

/// Load configuration: optional file named by `GATEWAY_CONFIG`, then
/// environment overrides, then validation.
pub async fn load_config() -> ConfigResult<GatewayConfig> {
    let mut config = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => load_from_file(path.trim()).await?,
        _ => GatewayConfig::default(),
    };

    config.apply_env()?;
    config.validate()?;
    Ok(config)
}

/// Parse a YAML configuration file
pub async fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<GatewayConfig> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let config = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), "Loaded configuration file");
    Ok(config)
}

impl GatewayConfig {
    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> ConfigResult<()> {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Apply overrides using `lookup` to read variables.
    ///
    /// Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let secret = |name: &str| get(name).map(SecretString::new);

        if let Some(v) = get("GATEWAY_HOST") {
            self.server.host = v;
        }
        if let Some(v) = get("GATEWAY_PORT") {
            self.server.port = parse_env("GATEWAY_PORT", &v)?;
        }
        if let Some(v) = get("GATEWAY_UPSTREAM_TIMEOUT_SECS") {
            let secs: u64 = parse_env("GATEWAY_UPSTREAM_TIMEOUT_SECS", &v)?;
            self.upstream.timeout = Duration::from_secs(secs);
        }
        if let Some(v) = get("CORS_ALLOW_ORIGIN") {
            self.cors.allow_origin = v;
        }

        if let Some(v) = secret("DOUBAO_API_KEY").or_else(|| secret("ARK_API_KEY")) {
            self.doubao.api_key = Some(v);
        }
        if let Some(v) = get("DOUBAO_BASE_URL") {
            self.doubao.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("DOUBAO_CHAT_MODEL") {
            self.doubao.chat_model = v;
        }
        if let Some(v) = get("DOUBAO_IMAGE_MODEL") {
            self.doubao.image_model = v;
        }
        if let Some(v) = get("DOUBAO_VIDEO_MODEL") {
            self.doubao.video_model = v;
        }

        if let Some(v) = get("QIANFAN_BASE_URL") {
            self.qianfan.base_url = v;
        }
        if let Some(v) = get("QIANFAN_AUTH_URL") {
            self.qianfan.auth_url = v;
        }
        if let Some(v) = secret("QIANFAN_BEARER_TOKEN") {
            self.qianfan.bearer_credential = Some(v);
        }
        if let Some(v) = secret("QIANFAN_API_KEY") {
            self.qianfan.api_key = Some(v);
        }
        if let Some(v) = secret("QIANFAN_SECRET_KEY") {
            self.qianfan.secret_key = Some(v);
        }
        if let Some(v) = secret("QIANFAN_ACCESS_TOKEN") {
            self.qianfan.access_token = Some(v);
        }
        if let Some(v) = get("QIANFAN_MODEL") {
            self.qianfan.model = v;
        }
        if let Some(v) = get("QIANFAN_QUOTA_PHRASES") {
            self.qianfan.quota.phrases = split_list(&v);
        }
        if let Some(v) = get("QIANFAN_QUOTA_CODES") {
            self.qianfan.quota.codes = split_list(&v)
                .iter()
                .map(|c| parse_env("QIANFAN_QUOTA_CODES", c))
                .collect::<ConfigResult<_>>()?;
        }

        if let Some(v) = get("VOLC_TTS_URL") {
            self.tts.url = v;
        }
        if let Some(v) = secret("VOLC_TTS_TOKEN") {
            self.tts.api_key = Some(v);
        }
        if let Some(v) = get("VOLC_TTS_VOICE") {
            self.tts.default_voice = v;
        }

        if let Some(v) = get("LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = get("LOG_FORMAT") {
            self.logging.format = v.to_ascii_lowercase();
        }

        for (name, slot) in [
            ("DEFAULT_CHAT_PROVIDER", &mut self.default_providers.chat),
            ("DEFAULT_IMAGE_PROVIDER", &mut self.default_providers.image),
            ("DEFAULT_VIDEO_PROVIDER", &mut self.default_providers.video),
            ("DEFAULT_SPEECH_PROVIDER", &mut self.default_providers.speech),
        ] {
            if let Some(v) = get(name) {
                *slot = Vendor::from_str(&v).map_err(|_| ConfigError::InvalidEnv {
                    name: name.to_string(),
                    value: v,
                })?;
            }
        }

        debug!("Applied environment overrides");
        Ok(())
    }
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> ConfigResult<T> {
    value.parse().map_err(|_| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Split on `|` or `,`, trimming and dropping empty items
fn split_list(raw: &str) -> Vec<String> {
    raw.split(['|', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
