//! Error types for the Gateway SDK.

use gateway_core::ErrorCode;
use thiserror::Error;

/// Result type for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using the Gateway SDK.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error during client setup.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a failure envelope or a non-200 status.
    #[error(
        "API error ({status}): {}{}",
        code.as_deref().unwrap_or("UNKNOWN"),
        message.as_deref().map(|m| format!(" - {m}")).unwrap_or_default()
    )]
    Api {
        /// HTTP status code.
        status: u16,
        /// Envelope error code, e.g. `QUOTA_EXCEEDED`.
        code: Option<String>,
        /// Envelope message, when present.
        message: Option<String>,
        /// Request ID for debugging.
        request_id: Option<String>,
    },

    /// Response parsing failed.
    #[error("Failed to parse response: {message}")]
    ParseError {
        /// Error message describing the parse failure.
        message: String,
    },

    /// Timeout waiting for response.
    #[error("Request timed out after {duration_ms}ms")]
    Timeout {
        /// Duration in milliseconds before timeout.
        duration_ms: u64,
    },

    /// Connection error.
    #[error("Connection error: {message}")]
    Connection {
        /// Error message describing the connection error.
        message: String,
    },
}

impl Error {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an API error from an envelope code.
    pub fn api(status: u16, code: impl Into<String>) -> Self {
        Self::Api {
            status,
            code: Some(code.into()),
            message: None,
            request_id: None,
        }
    }

    /// Create a parse error.
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Get the HTTP status code if available.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the envelope error code if available.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Typed envelope error code, if available.
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.code().map(ErrorCode::from)
    }

    /// Whether the gateway rejected the input before calling a provider.
    ///
    /// Resending the same request cannot succeed.
    pub fn is_validation(&self) -> bool {
        self.error_code().is_some_and(|code| code.is_validation())
    }

    /// Get the request ID if available.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Api { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::configuration("invalid base URL");
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.to_string().contains("invalid base URL"));
    }

    #[test]
    fn test_api_error_accessors() {
        let err = Error::api(429, "QUOTA_EXCEEDED");
        assert_eq!(err.status_code(), Some(429));
        assert_eq!(err.code(), Some("QUOTA_EXCEEDED"));
        assert_eq!(err.to_string(), "API error (429): QUOTA_EXCEEDED");
        assert_eq!(err.error_code(), Some(ErrorCode::QuotaExceeded));
        assert!(!err.is_validation());
        assert!(Error::timeout(5000).status_code().is_none());
    }

    #[test]
    fn test_api_error_message_and_validation() {
        let err = Error::Api {
            status: 400,
            code: Some("TEXT_TOO_LONG".to_string()),
            message: Some("text exceeds 2000 characters".to_string()),
            request_id: Some("req-1".to_string()),
        };
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "API error (400): TEXT_TOO_LONG - text exceeds 2000 characters"
        );
        assert_eq!(err.request_id(), Some("req-1"));
    }
}
