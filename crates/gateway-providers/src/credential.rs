//! Authorization header resolution.
//!
//! Static-key vendors read a configured secret. The enterprise LLM vendor
//! tries, in order: a pre-issued `bce-v3/` credential, a cached access token
//! that is more than [`REFRESH_WINDOW_SECS`] from expiry, and finally an
//! OAuth client-credentials exchange whose result is cached.
//!
//! The cache is lock-free. Concurrent callers that all see a stale token may
//! each run an exchange; the last one to store wins.

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use gateway_core::{Clock, SystemClock};
use gateway_telemetry::GatewayMetrics;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Seconds before expiry at which a cached token is considered stale
pub const REFRESH_WINDOW_SECS: i64 = 60;

/// Prefix identifying a pre-issued enterprise LLM credential
pub const BEARER_CREDENTIAL_PREFIX: &str = "bce-v3/";

/// Source of an `Authorization` header value.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Header value, or `None` to send the request without one
    async fn authorization_header(&self) -> Option<String>;
}

/// How a static key is rendered into the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Bearer <key>`
    Bearer,
    /// `Bearer;<key>`, used by the speech vendor
    BearerSemicolon,
}

/// A pre-configured secret read as-is.
#[derive(Debug, Clone)]
pub struct StaticKeyCredential {
    key: Option<SecretString>,
    scheme: AuthScheme,
}

impl StaticKeyCredential {
    /// Create a credential; `None` means the secret is not configured
    #[must_use]
    pub fn new(key: Option<SecretString>, scheme: AuthScheme) -> Self {
        Self { key, scheme }
    }

    /// Whether a secret is configured
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.key.is_some()
    }

    /// Rendered header value
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        let key = self.key.as_ref()?.expose_secret();
        Some(match self.scheme {
            AuthScheme::Bearer => format!("Bearer {key}"),
            AuthScheme::BearerSemicolon => format!("Bearer;{key}"),
        })
    }
}

#[async_trait]
impl CredentialProvider for StaticKeyCredential {
    async fn authorization_header(&self) -> Option<String> {
        self.header_value()
    }
}

/// A cached access token
#[derive(Debug, Clone)]
pub struct Credential {
    /// Access token
    pub token: SecretString,
    /// Expiry in epoch seconds; `None` never expires
    pub expire_at: Option<i64>,
}

impl Credential {
    /// Whether the token is usable at `now`
    #[must_use]
    pub fn is_fresh(&self, now: i64) -> bool {
        self.expire_at
            .map_or(true, |expire_at| expire_at.saturating_sub(now) > REFRESH_WINDOW_SECS)
    }
}

/// Token returned by a credential exchange
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    /// Access token
    pub access_token: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Credential exchange errors
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The exchange endpoint could not be reached
    #[error("Token exchange request failed: {0}")]
    Http(String),
    /// The exchange endpoint rejected the key pair
    #[error("Token exchange rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status
        status: u16,
        /// Response body
        body: String,
    },
    /// The response did not contain a token
    #[error("Token exchange returned no access token: {0}")]
    MissingToken(String),
}

/// Exchanges long-lived keys for a short-lived access token.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Run one exchange
    async fn exchange(&self) -> Result<TokenGrant, CredentialError>;
}

/// OAuth client-credentials exchange against the vendor's token endpoint.
pub struct OAuthTokenExchange {
    client: Client,
    auth_url: String,
    api_key: SecretString,
    secret_key: SecretString,
}

impl OAuthTokenExchange {
    /// Create an exchange
    #[must_use]
    pub fn new(
        client: Client,
        auth_url: impl Into<String>,
        api_key: SecretString,
        secret_key: SecretString,
    ) -> Self {
        Self {
            client,
            auth_url: auth_url.into(),
            api_key,
            secret_key,
        }
    }

    fn token_url(&self) -> Result<Url, CredentialError> {
        let mut url =
            Url::parse(&self.auth_url).map_err(|e| CredentialError::Http(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("grant_type", "client_credentials")
            .append_pair("client_id", self.api_key.expose_secret())
            .append_pair("client_secret", self.secret_key.expose_secret());
        Ok(url)
    }
}

#[async_trait]
impl TokenExchange for OAuthTokenExchange {
    async fn exchange(&self) -> Result<TokenGrant, CredentialError> {
        let response = self
            .client
            .post(self.token_url()?)
            .send()
            .await
            .map_err(|e| CredentialError::Http(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CredentialError::Http(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(CredentialError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<TokenGrant>(&body)
            .ok()
            .filter(|grant| !grant.access_token.is_empty())
            .ok_or(CredentialError::MissingToken(body))
    }
}

/// Process-wide access token cache.
#[derive(Debug)]
pub struct CredentialStore {
    current: ArcSwapOption<Credential>,
    clock: Arc<dyn Clock>,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl CredentialStore {
    /// Create an empty store
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            clock,
        }
    }

    /// Current cached credential, fresh or not
    #[must_use]
    pub fn get(&self) -> Option<Arc<Credential>> {
        self.current.load_full()
    }

    /// Cached token if it is still fresh at `now`
    #[must_use]
    pub fn fresh_token(&self, now: i64) -> Option<String> {
        self.current
            .load_full()
            .filter(|c| c.is_fresh(now))
            .map(|c| c.token.expose_secret().clone())
    }

    /// Cache a token obtained at `now` that lives `expires_in` seconds
    pub fn store(&self, token: impl Into<String>, expires_in: i64, now: i64) {
        self.current.store(Some(Arc::new(Credential {
            token: SecretString::new(token.into()),
            expire_at: Some(now.saturating_add(expires_in)),
        })));
    }

    /// Cache a token with no known expiry
    pub fn seed(&self, token: SecretString) {
        self.current.store(Some(Arc::new(Credential {
            token,
            expire_at: None,
        })));
    }

    /// Return the cached token, running `exchange` first if it is absent or stale.
    ///
    /// Only an exchange that actually runs is counted in `metrics`.
    pub async fn refresh_if_needed(
        &self,
        exchange: &dyn TokenExchange,
        metrics: Option<&GatewayMetrics>,
    ) -> Result<String, CredentialError> {
        if let Some(token) = self.fresh_token(self.clock.now()) {
            return Ok(token);
        }

        debug!("Cached access token absent or stale, exchanging keys");
        let result = exchange.exchange().await;
        if let Some(metrics) = metrics {
            metrics.record_token_exchange(result.is_ok());
        }
        let grant = result?;
        self.store(grant.access_token.clone(), grant.expires_in, self.clock.now());
        Ok(grant.access_token)
    }
}

/// Credential chain for the enterprise LLM vendor.
pub struct QianfanCredential {
    bearer: Option<SecretString>,
    exchange: Option<Arc<dyn TokenExchange>>,
    store: Arc<CredentialStore>,
    metrics: Option<GatewayMetrics>,
}

impl QianfanCredential {
    /// Create a credential chain.
    ///
    /// `bearer` is only honored when it carries the `bce-v3/` prefix.
    #[must_use]
    pub fn new(
        bearer: Option<SecretString>,
        exchange: Option<Arc<dyn TokenExchange>>,
        store: Arc<CredentialStore>,
    ) -> Self {
        let bearer =
            bearer.filter(|b| b.expose_secret().starts_with(BEARER_CREDENTIAL_PREFIX));
        Self {
            bearer,
            exchange,
            store,
            metrics: None,
        }
    }

    /// Count token exchanges
    #[must_use]
    pub fn with_metrics(mut self, metrics: GatewayMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Shared token cache
    #[must_use]
    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }
}

#[async_trait]
impl CredentialProvider for QianfanCredential {
    async fn authorization_header(&self) -> Option<String> {
        if let Some(bearer) = &self.bearer {
            return Some(format!("Bearer {}", bearer.expose_secret()));
        }

        let Some(exchange) = &self.exchange else {
            return self
                .store
                .fresh_token(self.store.clock.now())
                .map(|token| format!("Bearer {token}"));
        };

        match self
            .store
            .refresh_if_needed(exchange.as_ref(), self.metrics.as_ref())
            .await
        {
            Ok(token) => Some(format!("Bearer {token}")),
            Err(e) => {
                warn!(error = %e, "Token exchange failed, sending request without credentials");
                None
            }
        }
    }
}
