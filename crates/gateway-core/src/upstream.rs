//! Wire-level description of one provider call and its raw result.

use bytes::Bytes;
use serde_json::Value;

/// HTTP method of an upstream call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamMethod {
    /// GET without a body
    Get,
    /// POST with a JSON body
    Post,
}

/// A fully adapted provider call, ready for the invoker.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    /// HTTP method
    pub method: UpstreamMethod,
    /// Absolute provider URL
    pub url: String,
    /// JSON body for POST calls
    pub body: Option<Value>,
}

impl UpstreamRequest {
    /// POST `body` to `url`
    #[must_use]
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: UpstreamMethod::Post,
            url: url.into(),
            body: Some(body),
        }
    }

    /// GET `url`
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: UpstreamMethod::Get,
            url: url.into(),
            body: None,
        }
    }
}

/// Decoded provider response body, chosen from the declared content type.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    /// `application/json`
    Json(Value),
    /// Anything not JSON or audio, decoded as UTF-8
    Text(String),
    /// `audio/*` payload
    Binary {
        /// Raw bytes
        bytes: Bytes,
        /// Declared content type
        mime_type: String,
    },
}

impl UpstreamBody {
    /// Short label for logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Json(_) => "json",
            Self::Text(_) => "text",
            Self::Binary { .. } => "binary",
        }
    }

    /// Body as a JSON value; text becomes a JSON string
    #[must_use]
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Self::Json(v) => Some(v.clone()),
            Self::Text(s) => Some(Value::String(s.clone())),
            Self::Binary { .. } => None,
        }
    }
}

/// Status and decoded body of an upstream call.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResult {
    /// Upstream HTTP status
    pub status: u16,
    /// Decoded body
    pub body: UpstreamBody,
}

impl UpstreamResult {
    /// Create a result
    #[must_use]
    pub fn new(status: u16, body: UpstreamBody) -> Self {
        Self { status, body }
    }

    /// Whether the upstream status is in the 2xx range
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_range() {
        assert!(UpstreamResult::new(200, UpstreamBody::Json(json!({}))).is_success());
        assert!(UpstreamResult::new(204, UpstreamBody::Text(String::new())).is_success());
        assert!(!UpstreamResult::new(302, UpstreamBody::Text(String::new())).is_success());
        assert!(!UpstreamResult::new(429, UpstreamBody::Text(String::new())).is_success());
    }

    #[test]
    fn test_body_to_value() {
        assert_eq!(UpstreamBody::Text("oops".into()).to_value(), Some(json!("oops")));
        let binary = UpstreamBody::Binary {
            bytes: Bytes::from_static(b"ID3"),
            mime_type: "audio/mpeg".into(),
        };
        assert_eq!(binary.to_value(), None);
        assert_eq!(binary.kind(), "binary");
    }
}
