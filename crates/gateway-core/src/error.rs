//! Error taxonomy for the gateway.
//!
//! Every failure the gateway reports to a caller carries an [`ErrorCode`]. Local
//! failures (configuration, validation, protocol) are raised as [`GatewayError`]
//! before any upstream call is made; upstream failures are normalized into a
//! [`crate::GatewayResponse`] instead.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Result alias used throughout the gateway crates
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Uniform error code returned in the `error` field of the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Required provider configuration is absent
    ConfigMissing,
    /// HTTP method not accepted by the endpoint
    MethodNotAllowed,
    /// Chat request without messages
    MessagesRequired,
    /// Image request without a prompt
    PromptRequired,
    /// Video request without content parts
    ContentRequired,
    /// Video status request without a task id
    IdRequired,
    /// Speech text empty after trimming
    TextEmpty,
    /// Speech text over the length ceiling
    TextTooLong,
    /// Provider quota exhausted
    QuotaExceeded,
    /// Network, parse, or unclassified upstream failure
    ServerError,
    /// Client-side poll loop exceeded its budget
    Timeout,
    /// Route names a provider that does not serve the capability
    UnsupportedCapability,
    /// Opaque code forwarded from the provider
    Provider(String),
}

impl ErrorCode {
    /// Wire representation of the code
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ConfigMissing => "CONFIG_MISSING",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::MessagesRequired => "MESSAGES_REQUIRED",
            Self::PromptRequired => "PROMPT_REQUIRED",
            Self::ContentRequired => "CONTENT_REQUIRED",
            Self::IdRequired => "ID_REQUIRED",
            Self::TextEmpty => "TEXT_EMPTY",
            Self::TextTooLong => "TEXT_TOO_LONG",
            Self::QuotaExceeded => "QUOTA_EXCEEDED",
            Self::ServerError => "SERVER_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::UnsupportedCapability => "UNSUPPORTED_CAPABILITY",
            Self::Provider(code) => code,
        }
    }

    /// Whether this code reports a problem with the caller's input
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MessagesRequired
                | Self::PromptRequired
                | Self::ContentRequired
                | Self::IdRequired
                | Self::TextEmpty
                | Self::TextTooLong
        )
    }
}

impl From<&str> for ErrorCode {
    fn from(value: &str) -> Self {
        match value {
            "CONFIG_MISSING" => Self::ConfigMissing,
            "METHOD_NOT_ALLOWED" => Self::MethodNotAllowed,
            "MESSAGES_REQUIRED" => Self::MessagesRequired,
            "PROMPT_REQUIRED" => Self::PromptRequired,
            "CONTENT_REQUIRED" => Self::ContentRequired,
            "ID_REQUIRED" => Self::IdRequired,
            "TEXT_EMPTY" => Self::TextEmpty,
            "TEXT_TOO_LONG" => Self::TextTooLong,
            "QUOTA_EXCEEDED" => Self::QuotaExceeded,
            "SERVER_ERROR" => Self::ServerError,
            "TIMEOUT" => Self::Timeout,
            "UNSUPPORTED_CAPABILITY" => Self::UnsupportedCapability,
            other => Self::Provider(other.to_string()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// Errors raised by the gateway before or around an upstream call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// A provider secret or setting required for the call is not configured
    #[error("Configuration missing: {setting}")]
    ConfigMissing {
        /// Name of the missing setting
        setting: String,
    },

    /// The endpoint does not accept this HTTP method
    #[error("Method not allowed: {method}")]
    MethodNotAllowed {
        /// Method that was rejected
        method: String,
    },

    /// Caller input failed local validation
    #[error("Validation error: {message}")]
    Validation {
        /// Validation code (one of the `*_REQUIRED` / `TEXT_*` codes)
        code: ErrorCode,
        /// Human-readable message
        message: String,
    },

    /// No provider serves this capability under the requested name
    #[error("Provider '{provider}' does not support {capability}")]
    UnsupportedCapability {
        /// Requested provider name
        provider: String,
        /// Requested capability
        capability: String,
    },

    /// Network-level failure reaching the provider
    #[error("Upstream request failed: {message}")]
    Network {
        /// Underlying error message
        message: String,
    },

    /// Internal failure
    #[error("Internal error: {message}")]
    Internal {
        /// Error message
        message: String,
    },
}

impl GatewayError {
    /// Create a validation error
    pub fn validation(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    /// Create a configuration-missing error
    pub fn config_missing(setting: impl Into<String>) -> Self {
        Self::ConfigMissing {
            setting: setting.into(),
        }
    }

    /// Create a method-not-allowed error
    pub fn method_not_allowed(method: impl Into<String>) -> Self {
        Self::MethodNotAllowed {
            method: method.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Envelope error code for this error
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ConfigMissing { .. } => ErrorCode::ConfigMissing,
            Self::MethodNotAllowed { .. } => ErrorCode::MethodNotAllowed,
            Self::Validation { code, .. } => code.clone(),
            Self::UnsupportedCapability { .. } => ErrorCode::UnsupportedCapability,
            Self::Network { .. } | Self::Internal { .. } => ErrorCode::ServerError,
        }
    }

    /// HTTP status code the gateway answers with
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::UnsupportedCapability { .. } => 404,
            Self::MethodNotAllowed { .. } => 405,
            Self::ConfigMissing { .. } | Self::Network { .. } | Self::Internal { .. } => 500,
        }
    }

    /// Message placed in the envelope
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Validation { message, .. }
            | Self::Network { message }
            | Self::Internal { message } => message.clone(),
            other => other.to_string(),
        }
    }
}
