//! Rendering gateway results as HTTP responses.
//!
//! Every response body, success or failure, is the uniform envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gateway_core::{GatewayError, GatewayResponse};

/// An envelope with its HTTP status
#[derive(Debug, Clone)]
pub struct ApiResponse(pub GatewayResponse);

impl From<GatewayResponse> for ApiResponse {
    fn from(response: GatewayResponse) -> Self {
        Self(response)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0)).into_response()
    }
}

/// A request rejected by the server layer
#[derive(Debug, Clone, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub GatewayError);

impl ApiError {
    /// 405 for `method`
    pub fn method_not_allowed(method: impl Into<String>) -> Self {
        Self(GatewayError::method_not_allowed(method))
    }

    /// 404 for an unknown provider or route
    pub fn unsupported(provider: impl Into<String>, capability: impl Into<String>) -> Self {
        Self(GatewayError::UnsupportedCapability {
            provider: provider.into(),
            capability: capability.into(),
        })
    }

    /// 500 for an unexpected server failure
    pub fn internal(message: impl Into<String>) -> Self {
        Self(GatewayError::internal(message))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ApiResponse(GatewayResponse::from(self.0)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::ErrorCode;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_error_envelope() {
        let response = ApiError::method_not_allowed("PUT").into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"], "METHOD_NOT_ALLOWED");
    }

    #[tokio::test]
    async fn test_status_follows_envelope() {
        let response =
            ApiResponse(GatewayResponse::failure(429, ErrorCode::QuotaExceeded)).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
