//! Route definitions for the gateway API.

use axum::{
    extract::{Query, State},
    routing::{get, post, MethodRouter},
    Router,
};
use gateway_core::{Capability, Vendor};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{
    extractors::{LenientJson, RequestId, TaskId},
    handlers::{self, StatusQuery},
    middleware,
    state::AppState,
};

/// Vendors with explicit `/api/{vendor}/...` routes
const VENDORS: [Vendor; 3] = [Vendor::Doubao, Vendor::Qianfan, Vendor::VolcTts];

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .merge(capability_routes(None));

    for vendor in VENDORS {
        router = router.merge(capability_routes(Some(vendor)));
    }

    router
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(middleware::request_id_middleware))
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    middleware::cors_middleware,
                )),
        )
        .with_state(state)
}

/// Capability routes under `/api` (default vendors) or `/api/{vendor}`
fn capability_routes(vendor: Option<Vendor>) -> Router<AppState> {
    let prefix = vendor.map_or_else(|| "/api".to_string(), |v| format!("/api/{v}"));

    Router::new()
        .route(&format!("{prefix}/chat"), with_405(submit(Capability::Chat, vendor)))
        .route(&format!("{prefix}/image"), with_405(submit(Capability::Image, vendor)))
        .route(
            &format!("{prefix}/video"),
            with_405(submit(Capability::VideoCreate, vendor).merge(status(vendor))),
        )
        .route(&format!("{prefix}/video/"), with_405(status(vendor)))
        .route(&format!("{prefix}/video/:id"), with_405(status(vendor)))
        .route(&format!("{prefix}/speech"), with_405(submit(Capability::Speech, vendor)))
}

fn submit(capability: Capability, vendor: Option<Vendor>) -> MethodRouter<AppState> {
    post(
        move |State(state): State<AppState>, request_id: RequestId, LenientJson(body): LenientJson| async move {
            handlers::generate(&state, &request_id, capability, vendor, &body, None).await
        },
    )
}

fn status(vendor: Option<Vendor>) -> MethodRouter<AppState> {
    get(
        move |State(state): State<AppState>,
              request_id: RequestId,
              task_id: TaskId,
              query: Option<Query<StatusQuery>>| async move {
            handlers::video_status(&state, &request_id, vendor, task_id, query).await
        },
    )
}

fn with_405(router: MethodRouter<AppState>) -> MethodRouter<AppState> {
    router.fallback(handlers::method_not_allowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::REQUEST_ID_HEADER;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use gateway_config::GatewayConfig;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::builder()
            .config(GatewayConfig::default())
            .build()
            .unwrap();
        create_router(state)
    }

    async fn send(method: Method, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_preflight_on_any_path() {
        for uri in ["/api/chat", "/api/qianfan/chat", "/nowhere"] {
            let request = Request::builder()
                .method(Method::OPTIONS)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let response = app().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::NO_CONTENT, "{uri}");
            assert_eq!(
                response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS],
                middleware::ALLOW_HEADERS
            );
            assert!(response.headers().contains_key(REQUEST_ID_HEADER), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_preflight_echoes_request_id() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/chat")
            .header(REQUEST_ID_HEADER, "req-42")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-42");
    }

    #[tokio::test]
    async fn test_wrong_method() {
        let (status, body) = send(Method::GET, "/api/chat").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "METHOD_NOT_ALLOWED");

        let (status, _) = send(Method::DELETE, "/api/doubao/video/cgt-1").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, _) = send(Method::PUT, "/api/volc-tts/speech").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_unknown_provider() {
        let (status, body) = send(Method::POST, "/api/openai/chat").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "UNSUPPORTED_CAPABILITY");

        let (status, body) = send(Method::POST, "/api/volc-tts/chat").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "UNSUPPORTED_CAPABILITY");
    }

    #[tokio::test]
    async fn test_missing_config_on_default_route() {
        let (status, body) = send(Method::POST, "/api/image").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "CONFIG_MISSING");
    }

    #[tokio::test]
    async fn test_health_lists_providers() {
        let (status, body) = send(Method::GET, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["providers"].as_array().map(Vec::len), Some(5));
        assert_eq!(body["config"]["doubao_api_key"], false);
    }
}
