//! Custom Axum extractors for the gateway.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use bytes::Bytes;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ApiError;

/// Header carrying the request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Extract request ID from headers or generate one
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    /// Read the inbound id, falling back to a fresh UUID v4
    #[must_use]
    pub fn from_headers(headers: &axum::http::HeaderMap) -> Self {
        let id = headers
            .get(REQUEST_ID_HEADER)
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);
        Self(id)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(id.clone());
        }
        Ok(Self::from_headers(&parts.headers))
    }
}

/// JSON body that never rejects: an empty, malformed or non-object body
/// is read as `{}`
#[derive(Debug, Clone)]
pub struct LenientJson(pub Value);

#[async_trait]
impl<S> FromRequest<S> for LenientJson
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to read request body: {e}")))?;

        let value = match serde_json::from_slice::<Value>(&bytes) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) | Err(_) => {
                if !bytes.is_empty() {
                    debug!(len = bytes.len(), "Request body is not a JSON object, using {{}}");
                }
                Value::Object(Map::new())
            }
        };

        Ok(Self(value))
    }
}

/// The `:id` path segment; empty when the route has none
#[derive(Debug, Clone, Default)]
pub struct TaskId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for TaskId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(Path(params)) = Path::<Vec<(String, String)>>::from_request_parts(parts, state).await
        else {
            return Ok(Self::default());
        };

        Ok(Self(
            params
                .into_iter()
                .find(|(key, _)| key == "id")
                .map(|(_, value)| value)
                .unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    #[tokio::test]
    async fn test_lenient_json_falls_back_to_empty_object() {
        for raw in ["", "{not json", "[1,2]", "\"text\""] {
            let req = HttpRequest::builder().body(Body::from(raw)).unwrap();
            let LenientJson(value) = LenientJson::from_request(req, &()).await.unwrap();
            assert_eq!(value, serde_json::json!({}), "{raw}");
        }

        let req = HttpRequest::builder()
            .body(Body::from(r#"{"prompt":"fox"}"#))
            .unwrap();
        let LenientJson(value) = LenientJson::from_request(req, &()).await.unwrap();
        assert_eq!(value["prompt"], "fox");
    }

    #[test]
    fn test_request_id_from_headers() {
        let mut headers = axum::http::HeaderMap::new();
        assert_eq!(RequestId::from_headers(&headers).0.len(), 36);

        headers.insert(REQUEST_ID_HEADER, "abc-123".parse().unwrap());
        assert_eq!(RequestId::from_headers(&headers).0, "abc-123");
    }
}
