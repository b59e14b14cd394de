//! End-to-end integration tests
//!
//! Each test starts a gateway on a loopback port and drives it through the
//! SDK, the way an application would.

use crate::helpers::*;
use crate::mock_providers::*;
use gateway_sdk::{
    ChatMessage, ChatRequest, Client, ContentPart, ErrorCode, ImageRequest, ManualClock,
    MessageContent, PollOutcome, PollerConfig, SpeechRequest, TaskStatus, Vendor, VideoCreateRequest,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_e2e_chat_parts_are_sanitized() {
    init_tracing();
    let upstream = MockUpstream::start().await;
    upstream
        .mock_doubao_chat(
            json!({"messages": [{"role": "user", "content": [{"type": "text", "text": "hi"}]}]}),
            "hello there",
        )
        .await;
    let server = TestServer::start(upstream.gateway_config()).await;

    let request = ChatRequest::builder()
        .message(ChatMessage {
            role: "user".to_string(),
            content: MessageContent::Parts(vec![ContentPart::text("`hi`")]),
        })
        .build();
    let completion = server.sdk().chat(&request).await.expect("chat");

    assert_eq!(completion.content(), "hello there");
    assert_eq!(completion.usage.map(|u| u.total_tokens), Some(7));
}

#[tokio::test]
async fn test_e2e_envelope_wraps_upstream_body() {
    let upstream = MockUpstream::start().await;
    upstream
        .mock_doubao_chat(json!({"messages": [{"role": "user"}]}), "ok")
        .await;
    let server = TestServer::start(upstream.gateway_config()).await;

    let response = server
        .post_json(
            "/api/chat",
            &json!({"messages": [{"role": "user", "content": [{"type": "text", "text": "`hi`"}]}]}),
        )
        .await;
    assert_status(&response, 200);

    let body = TestServer::json_body(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["data"], chat_response("ok"));
}

#[tokio::test]
async fn test_e2e_image_without_prompt_never_calls_upstream() {
    let upstream = MockUpstream::start().await;
    upstream.forbid_doubao_image().await;
    let server = TestServer::start(upstream.gateway_config()).await;

    let error = server
        .sdk()
        .image(&ImageRequest::new("   "))
        .await
        .err()
        .expect("blank prompt should fail");
    assert_eq!(error.status_code(), Some(400));
    assert_eq!(error.code(), Some("PROMPT_REQUIRED"));

    let response = server.post_json("/api/image", &json!({"size": "1024x1024"})).await;
    assert_status(&response, 400);
    assert_eq!(TestServer::json_body(response).await["error"], "PROMPT_REQUIRED");
}

#[tokio::test]
async fn test_e2e_video_status_requires_id() {
    let upstream = MockUpstream::start().await;
    let server = TestServer::start(upstream.gateway_config()).await;

    let response = server.get("/api/video/").await;
    assert_status(&response, 400);
    assert_eq!(TestServer::json_body(response).await["error"], "ID_REQUIRED");

    let error = server
        .sdk()
        .video_status("")
        .await
        .err()
        .expect("empty id should fail");
    assert_eq!(error.code(), Some("ID_REQUIRED"));
}

#[tokio::test]
async fn test_e2e_speech_length_limit() {
    let upstream = MockUpstream::start().await;
    upstream.forbid_tts().await;
    let server = TestServer::start(upstream.gateway_config()).await;

    let error = server
        .sdk()
        .speech(&SpeechRequest::new("a".repeat(2001)))
        .await
        .err()
        .expect("long text should fail");
    assert_eq!(error.status_code(), Some(400));
    assert_eq!(error.code(), Some("TEXT_TOO_LONG"));
}

#[tokio::test]
async fn test_e2e_speech_audio_roundtrip() {
    let upstream = MockUpstream::start().await;
    upstream.mock_tts(b"ID3\x04").await;
    let server = TestServer::start(upstream.gateway_config()).await;

    let audio = server
        .sdk()
        .speech(&SpeechRequest::new("a".repeat(2000)))
        .await
        .expect("speech");
    assert_eq!(audio.bytes.as_ref(), b"ID3\x04");
    assert_eq!(audio.content_type, "audio/mpeg");
}

#[tokio::test]
async fn test_e2e_video_task_polled_to_completion() {
    let upstream = MockUpstream::start().await;
    upstream.mock_video_create("cgt-42").await;
    upstream
        .mock_video_progress("cgt-42", 3, "https://cdn.example.com/cgt-42.mp4")
        .await;
    let server = TestServer::start(upstream.gateway_config()).await;
    let client = server.sdk();

    let task = client
        .create_video(&VideoCreateRequest::new(vec![ContentPart::text("a cat surfing")]))
        .await
        .expect("create");
    assert_eq!(task.id, "cgt-42");

    let clock = Arc::new(ManualClock::new());
    let seen = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&seen);
    let outcome = client
        .task_poller()
        .with_clock(clock.clone())
        .on_status(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .run(&task.id)
        .await
        .expect("poll");

    let PollOutcome::Finished { task, polls } = outcome else {
        panic!("expected a finished task, got {outcome:?}");
    };
    assert_eq!(polls, 4);
    assert_eq!(task.status, Some(TaskStatus::Succeeded));
    assert_eq!(task.video_url(), Some("https://cdn.example.com/cgt-42.mp4"));
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(10); 3]);
    assert_eq!(seen.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_e2e_video_poll_times_out() {
    let upstream = MockUpstream::start().await;
    upstream.mock_video_progress("cgt-slow", 100, "unused").await;
    let server = TestServer::start(upstream.gateway_config()).await;

    let clock = Arc::new(ManualClock::new());
    let outcome = server
        .sdk()
        .task_poller()
        .with_config(
            PollerConfig::default()
                .with_interval(Duration::from_secs(10))
                .with_timeout(Duration::from_secs(30)),
        )
        .with_clock(clock)
        .run("cgt-slow")
        .await
        .expect("poll");

    assert_eq!(outcome.polls(), 4);
    assert_eq!(outcome.code(), Some(ErrorCode::Timeout));
    assert!(outcome.task().is_none());
}

#[tokio::test]
async fn test_e2e_qianfan_token_exchanged_once() {
    let upstream = MockUpstream::start().await;
    upstream.mock_qianfan_token("24.cached").await;
    upstream.mock_qianfan_chat("24.cached", "ni hao").await;
    let server = TestServer::start(upstream.gateway_config()).await;

    let client = Client::builder()
        .base_url(&server.base_url)
        .provider(Vendor::Qianfan)
        .build()
        .expect("client");
    let request = ChatRequest::builder().message(ChatMessage::user("hello")).build();

    for _ in 0..3 {
        let completion = client.chat(&request).await.expect("chat");
        assert_eq!(completion.content(), "ni hao");
    }
}

#[tokio::test]
async fn test_e2e_health_reports_configured_providers() {
    let upstream = MockUpstream::start().await;
    let server = TestServer::start(upstream.gateway_config()).await;

    let response = server.get("/health").await;
    assert_status(&response, 200);
    let body = TestServer::json_body(response).await;
    assert_eq!(body["status"], "healthy");

    let providers = body["providers"].as_array().expect("providers");
    assert_eq!(providers.len(), 3);
    assert!(providers.iter().all(|p| p["configured"] == true));
    assert_eq!(body["config"]["qianfan_credential"], "exchange");
}
