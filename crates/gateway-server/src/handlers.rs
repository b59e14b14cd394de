//! HTTP request handlers for the gateway API.

use axum::{
    extract::{Query, State},
    http::{header, Method, Uri},
    response::IntoResponse,
    Json,
};
use gateway_core::{Capability, Vendor};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    error::{ApiError, ApiResponse},
    extractors::{RequestId, TaskId},
    health::HealthResponse,
    state::AppState,
};

/// Run one capability request through the pipeline
#[instrument(
    name = "gateway.request",
    skip_all,
    fields(request_id = %request_id.0, capability = %capability, vendor = ?vendor)
)]
pub async fn generate(
    state: &AppState,
    request_id: &RequestId,
    capability: Capability,
    vendor: Option<Vendor>,
    body: &Value,
    task_id: Option<&str>,
) -> ApiResponse {
    debug!("Dispatching request");
    ApiResponse(
        state
            .service
            .handle(capability, vendor, body, task_id)
            .await,
    )
}

/// Query string accepted by the status route
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    /// Task id when the path carries none
    pub id: Option<String>,
}

/// Video task status. The id comes from the path, else from `?id=`.
pub async fn video_status(
    state: &AppState,
    request_id: &RequestId,
    vendor: Option<Vendor>,
    TaskId(path_id): TaskId,
    query: Option<Query<StatusQuery>>,
) -> ApiResponse {
    let id = if path_id.is_empty() {
        query.and_then(|Query(q)| q.id).unwrap_or_default()
    } else {
        path_id
    };

    generate(
        state,
        request_id,
        Capability::VideoStatus,
        vendor,
        &Value::Null,
        Some(id.as_str()),
    )
    .await
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from_state(&state))
}

/// Metrics endpoint (Prometheus format)
pub async fn metrics_endpoint(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let body = state
        .metrics
        .render()
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}

/// Method fallback for capability routes
pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::method_not_allowed(method.as_str())
}

/// Fallback for unmatched paths
pub async fn not_found(uri: Uri) -> ApiError {
    let mut segments = uri.path().trim_matches('/').split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some("api"), Some(provider), Some(capability)) => {
            ApiError::unsupported(provider, capability)
        }
        (Some("api"), Some(capability), None) => ApiError::unsupported("default", capability),
        _ => ApiError::unsupported("none", uri.path()),
    }
}
