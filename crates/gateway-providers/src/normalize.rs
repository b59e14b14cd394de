//! Mapping upstream results onto the uniform envelope.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use gateway_config::QuotaSettings;
use gateway_core::{ErrorCode, GatewayResponse, UpstreamBody, UpstreamResult};
use serde_json::Value;

/// Message returned with `QUOTA_EXCEEDED`
pub const QUOTA_MESSAGE: &str = "Provider quota exhausted; retry later or raise the account quota";

/// Quota-exhaustion indicators for one provider.
///
/// Matches when the error message contains any phrase (case-insensitive) or
/// the error code equals any listed code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaPolicy {
    phrases: Vec<String>,
    codes: Vec<i64>,
}

impl QuotaPolicy {
    /// Create a policy
    #[must_use]
    pub fn new(phrases: impl IntoIterator<Item = String>, codes: Vec<i64>) -> Self {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| p.to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            codes,
        }
    }

    /// Create a policy from configuration
    #[must_use]
    pub fn from_settings(settings: &QuotaSettings) -> Self {
        Self::new(settings.phrases.iter().cloned(), settings.codes.clone())
    }

    /// Whether an error with this code and message means quota exhaustion
    #[must_use]
    pub fn matches(&self, code: Option<&Value>, message: Option<&str>) -> bool {
        let code_hit = code.and_then(numeric_code).is_some_and(|c| self.codes.contains(&c));
        let phrase_hit = message.is_some_and(|m| {
            let m = m.to_lowercase();
            self.phrases.iter().any(|p| m.contains(p.as_str()))
        });
        code_hit || phrase_hit
    }
}

fn numeric_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Error indicators read from a provider body
#[derive(Debug, Default, PartialEq)]
struct ErrorFields {
    code: Option<Value>,
    message: Option<String>,
}

impl ErrorFields {
    /// Read `error.code`, `error_code` and `error_msg` shapes.
    fn from_value(value: &Value) -> Self {
        let nested = value.get("error").filter(|e| e.is_object());
        let code = nested
            .and_then(|e| e.get("code"))
            .or_else(|| value.get("error_code"))
            .filter(|c| !c.is_null())
            .cloned();
        let message = nested
            .and_then(|e| e.get("message"))
            .or_else(|| value.get("error_msg"))
            .and_then(Value::as_str)
            .map(String::from);
        Self { code, message }
    }

    fn is_error(&self) -> bool {
        self.code.is_some() || self.message.is_some()
    }

    /// Envelope code: `error.code`, then `error_code`, then `error_msg`
    fn error_code(&self) -> ErrorCode {
        match &self.code {
            Some(Value::String(s)) if !s.is_empty() => ErrorCode::from(s.as_str()),
            Some(Value::Number(n)) => ErrorCode::Provider(n.to_string()),
            _ => match &self.message {
                Some(m) if !m.is_empty() => ErrorCode::Provider(m.clone()),
                _ => ErrorCode::ServerError,
            },
        }
    }
}

/// Map an upstream result onto the envelope.
///
/// With a `quota` policy, a body whose error fields match it becomes
/// 429 `QUOTA_EXCEEDED` whatever the upstream status was.
#[must_use]
pub fn normalize(result: UpstreamResult, quota: Option<&QuotaPolicy>) -> GatewayResponse {
    let fields = match &result.body {
        UpstreamBody::Json(value) => ErrorFields::from_value(value),
        UpstreamBody::Text(text) => ErrorFields {
            code: None,
            message: Some(text.clone()).filter(|t| !t.is_empty()),
        },
        UpstreamBody::Binary { .. } => ErrorFields::default(),
    };

    if let Some(policy) = quota {
        let in_band_error = !result.is_success()
            || (matches!(result.body, UpstreamBody::Json(_)) && fields.is_error());
        if in_band_error && policy.matches(fields.code.as_ref(), fields.message.as_deref()) {
            let response =
                GatewayResponse::failure(429, ErrorCode::QuotaExceeded).with_message(QUOTA_MESSAGE);
            return match result.body.to_value() {
                Some(data) => response.with_data(data),
                None => response,
            };
        }
    }

    if result.is_success() {
        return match result.body {
            UpstreamBody::Json(value) => GatewayResponse::success(value),
            UpstreamBody::Text(text) => GatewayResponse::success(Value::String(text)),
            UpstreamBody::Binary { bytes, mime_type } => {
                GatewayResponse::audio(STANDARD.encode(&bytes), mime_type)
            }
        };
    }

    // Non-2xx statuses below 400 have no meaning to the caller.
    let status = if result.status >= 400 { result.status } else { 502 };
    let mut response = GatewayResponse::failure(status, fields.error_code());
    if let Some(message) = fields.message {
        response = response.with_message(message);
    }
    match result.body.to_value() {
        Some(data) => response.with_data(data),
        None => response,
    }
}
