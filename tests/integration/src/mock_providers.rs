//! Mock upstream vendors for integration testing
//!
//! One wiremock server stands in for every vendor; each lives under its own
//! path prefix so a single [`GatewayConfig`] can point at all of them.

use gateway_config::GatewayConfig;
use secrecy::SecretString;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Multimodal vendor key expected on upstream calls
pub const ARK_KEY: &str = "ark-key";
/// Speech vendor token
pub const TTS_TOKEN: &str = "tts-token";

const DOUBAO_PREFIX: &str = "/api/v3";
const QIANFAN_CHAT: &str = "/v2/chat/completions";
const QIANFAN_TOKEN: &str = "/oauth/2.0/token";
const TTS_PATH: &str = "/api/v1/tts";

/// Mock upstream for all vendors
pub struct MockUpstream {
    pub server: MockServer,
}

impl MockUpstream {
    /// Start an empty mock upstream
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Gateway configuration pointing every vendor here
    ///
    /// The enterprise LLM vendor authenticates through the AK/SK token
    /// exchange.
    pub fn gateway_config(&self) -> GatewayConfig {
        let uri = self.server.uri();
        let mut config = GatewayConfig::default();
        config.doubao.base_url = format!("{uri}{DOUBAO_PREFIX}");
        config.doubao.api_key = secret(ARK_KEY);
        config.qianfan.base_url = format!("{uri}{QIANFAN_CHAT}");
        config.qianfan.auth_url = format!("{uri}{QIANFAN_TOKEN}");
        config.qianfan.api_key = secret("qianfan-ak");
        config.qianfan.secret_key = secret("qianfan-sk");
        config.tts.url = format!("{uri}{TTS_PATH}");
        config.tts.api_key = secret(TTS_TOKEN);
        config
    }

    /// Doubao chat answering `content`; the request must contain `expected`
    pub async fn mock_doubao_chat(&self, expected: Value, content: &str) {
        Mock::given(method("POST"))
            .and(path(format!("{DOUBAO_PREFIX}/chat/completions")))
            .and(header("authorization", format!("Bearer {ARK_KEY}").as_str()))
            .and(body_partial_json(expected))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(content)))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Doubao image generation that must never be called
    pub async fn forbid_doubao_image(&self) {
        Mock::given(method("POST"))
            .and(path(format!("{DOUBAO_PREFIX}/images/generations")))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    /// Doubao video create returning `id`
    pub async fn mock_video_create(&self, id: &str) {
        Mock::given(method("POST"))
            .and(path(format!("{DOUBAO_PREFIX}/contents/generations/tasks")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": id})))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Task `id` reports `running` `running_polls` times, then succeeds
    pub async fn mock_video_progress(&self, id: &str, running_polls: u64, video_url: &str) {
        let status_path = format!("{DOUBAO_PREFIX}/contents/generations/tasks/{id}");

        Mock::given(method("GET"))
            .and(path(status_path.as_str()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": id, "status": "running"})),
            )
            .up_to_n_times(running_polls)
            .with_priority(1)
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(status_path.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": id,
                "status": "succeeded",
                "content": {"video_url": video_url}
            })))
            .with_priority(2)
            .mount(&self.server)
            .await;
    }

    /// Qianfan token exchange, expected exactly once
    pub async fn mock_qianfan_token(&self, token: &str) {
        Mock::given(method("POST"))
            .and(path(QIANFAN_TOKEN))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": token, "expires_in": 2_592_000})),
            )
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Qianfan chat accepting `token`
    pub async fn mock_qianfan_chat(&self, token: &str, content: &str) {
        Mock::given(method("POST"))
            .and(path(QIANFAN_CHAT))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(content)))
            .mount(&self.server)
            .await;
    }

    /// Speech synthesis returning raw mp3 `audio`
    pub async fn mock_tts(&self, audio: &[u8]) {
        Mock::given(method("POST"))
            .and(path(TTS_PATH))
            .and(header("authorization", format!("Bearer;{TTS_TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_raw(audio.to_vec(), "audio/mpeg"))
            .mount(&self.server)
            .await;
    }

    /// Speech endpoint that must never be called
    pub async fn forbid_tts(&self) {
        Mock::given(method("POST"))
            .and(path(TTS_PATH))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }
}

fn secret(value: &str) -> Option<SecretString> {
    Some(SecretString::new(value.to_string()))
}

/// OpenAI-style chat completion body
pub fn chat_response(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "mock-model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
    })
}
