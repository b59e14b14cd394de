//! HTTP middleware: CORS and request correlation.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::extractors::{RequestId, REQUEST_ID_HEADER};
use crate::state::AppState;

/// Methods advertised on preflight responses
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
/// Headers advertised on preflight responses
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Answer preflight requests with 204 and stamp the configured origin on
/// every response.
pub async fn cors_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let origin = HeaderValue::from_str(&state.config.cors.allow_origin)
        .unwrap_or_else(|_| HeaderValue::from_static("*"));

    if request.method() == Method::OPTIONS {
        debug!(path = %request.uri().path(), "Answering preflight");
        let mut response = StatusCode::NO_CONTENT.into_response();
        let headers = response.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        return response;
    }

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    response
}

/// Attach a request id to the request extensions and echo it back
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_headers(request.headers());
    let header_value = HeaderValue::from_str(&request_id.0).ok();
    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;
    if let Some(value) = header_value {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
