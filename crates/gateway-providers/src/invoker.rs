//! The single outbound HTTP call per gateway request.

use bytes::Bytes;
use gateway_core::{
    GatewayError, GatewayResult, UpstreamBody, UpstreamMethod, UpstreamRequest, UpstreamResult,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Issues provider calls and decodes their bodies by declared content type.
///
/// There are no retries: one call in, one result out.
#[derive(Debug, Clone)]
pub struct UpstreamInvoker {
    client: Client,
}

impl UpstreamInvoker {
    /// Create an invoker whose calls time out after `timeout`
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Underlying client, shared with the credential exchange
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Perform `request`.
    ///
    /// Network failures (DNS, refused connection, timeout) become
    /// `GatewayError::Network`; any HTTP status is returned as a result.
    pub async fn invoke(
        &self,
        request: &UpstreamRequest,
        authorization: Option<&str>,
    ) -> GatewayResult<UpstreamResult> {
        let mut builder = match request.method {
            UpstreamMethod::Get => self.client.get(&request.url),
            UpstreamMethod::Post => self.client.post(&request.url),
        };

        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        if let Some(body) = &request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").json(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(url = %request.url, error = %e, "Upstream request failed");
            GatewayError::network(e.without_url().to_string())
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let bytes = response.bytes().await.map_err(|e| {
            warn!(url = %request.url, error = %e, "Failed to read upstream body");
            GatewayError::network(e.without_url().to_string())
        })?;

        let body = decode_body(&content_type, bytes);
        debug!(
            url = %request.url,
            status,
            content_type = %content_type,
            body_kind = body.kind(),
            "Upstream responded"
        );

        Ok(UpstreamResult::new(status, body))
    }
}

/// Decode a body by content type: JSON, `audio/*` as bytes, anything else as text.
///
/// A body declared as JSON that does not parse is kept as text.
#[must_use]
pub fn decode_body(content_type: &str, bytes: Bytes) -> UpstreamBody {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime.starts_with("audio/") {
        return UpstreamBody::Binary {
            bytes,
            mime_type: mime,
        };
    }

    if mime == "application/json" || mime.ends_with("+json") {
        if let Ok(value) = serde_json::from_slice(&bytes) {
            return UpstreamBody::Json(value);
        }
    }

    UpstreamBody::Text(String::from_utf8_lossy(&bytes).into_owned())
}
