//! The uniform response envelope.
//!
//! Success: `{ "ok": true, "data": ... }` or, for audio,
//! `{ "ok": true, "audio_base64": ..., "content_type": ... }`.
//! Failure: `{ "ok": false, "error": CODE, "data"?: ..., "message"?: ... }`.

use crate::error::{ErrorCode, GatewayError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope returned by every capability endpoint, plus the HTTP status to
/// answer with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayResponse {
    /// HTTP status (not serialized)
    #[serde(skip, default = "default_status")]
    pub status: u16,

    /// Whether the call succeeded
    pub ok: bool,

    /// Provider payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Base64-encoded audio for speech results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<String>,

    /// Content type of the audio payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Error code on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,

    /// Human-readable message on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn default_status() -> u16 {
    200
}

impl GatewayResponse {
    /// Successful response carrying `data`
    #[must_use]
    pub fn success(data: Value) -> Self {
        Self {
            status: 200,
            ok: true,
            data: Some(data),
            audio_base64: None,
            content_type: None,
            error: None,
            message: None,
        }
    }

    /// Successful audio response
    #[must_use]
    pub fn audio(audio_base64: String, content_type: impl Into<String>) -> Self {
        Self {
            status: 200,
            ok: true,
            data: None,
            audio_base64: Some(audio_base64),
            content_type: Some(content_type.into()),
            error: None,
            message: None,
        }
    }

    /// Failed response
    #[must_use]
    pub fn failure(status: u16, error: ErrorCode) -> Self {
        Self {
            status,
            ok: false,
            data: None,
            audio_base64: None,
            content_type: None,
            error: Some(error),
            message: None,
        }
    }

    /// Attach a message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach provider payload to a failure
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Outcome label for logs and metrics
    #[must_use]
    pub fn outcome(&self) -> &str {
        match &self.error {
            None => "ok",
            Some(code) => code.as_str(),
        }
    }
}

impl From<GatewayError> for GatewayResponse {
    fn from(error: GatewayError) -> Self {
        Self::failure(error.status_code(), error.code()).with_message(error.message())
    }
}
