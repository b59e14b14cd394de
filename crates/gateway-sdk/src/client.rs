//! HTTP client for the Gateway SDK.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::poller::TaskPoller;
use crate::response::{ChatCompletion, ImageGeneration, SpeechAudio};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use gateway_core::{
    ChatRequest, GatewayResponse, ImageRequest, SpeechRequest, Vendor, VideoCreateRequest,
    VideoTask,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, USER_AGENT};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Client for the generation gateway.
///
/// # Example
///
/// ```rust,no_run
/// use gateway_sdk::{ChatMessage, ChatRequest, Client};
///
/// #[tokio::main]
/// async fn main() -> Result<(), gateway_sdk::Error> {
///     let client = Client::builder()
///         .base_url("http://localhost:8080")
///         .build()?;
///
///     let request = ChatRequest::builder()
///         .message(ChatMessage::user("Hello!"))
///         .build();
///     let completion = client.chat(&request).await?;
///
///     println!("{}", completion.content());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    /// HTTP client.
    http: reqwest::Client,
    /// Client configuration.
    config: Arc<ClientConfig>,
}

impl Client {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| Error::configuration(format!("Invalid user agent: {e}")))?,
        );

        if let Some(api_key) = config.api_key_value() {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {api_key}"))
                    .map_err(|e| Error::configuration(format!("Invalid API key: {e}")))?,
            );
        }

        for (name, value) in &config.custom_headers {
            let header_name = HeaderName::try_from(name.as_str()).map_err(|e| {
                Error::configuration(format!("Invalid header name '{name}': {e}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                Error::configuration(format!("Invalid header value for '{name}': {e}"))
            })?;
            headers.insert(header_name, header_value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Chat completion.
    #[instrument(skip_all)]
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let envelope = self.post(&["chat"], request).await?;
        data(envelope)
    }

    /// Image generation.
    #[instrument(skip_all)]
    pub async fn image(&self, request: &ImageRequest) -> Result<ImageGeneration> {
        let envelope = self.post(&["image"], request).await?;
        data(envelope)
    }

    /// Create a video generation task.
    #[instrument(skip_all)]
    pub async fn create_video(&self, request: &VideoCreateRequest) -> Result<VideoTask> {
        let envelope = self.post(&["video"], request).await?;
        task(envelope)
    }

    /// Look up a video generation task.
    #[instrument(skip(self))]
    pub async fn video_status(&self, id: &str) -> Result<VideoTask> {
        let url = self.url(&["video", id])?;
        debug!(%url, "Sending request");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;
        task(self.handle_response(response).await?)
    }

    /// Speech synthesis; the audio is decoded from base64.
    #[instrument(skip_all)]
    pub async fn speech(&self, request: &SpeechRequest) -> Result<SpeechAudio> {
        let envelope = self.post(&["speech"], request).await?;
        let encoded = envelope
            .audio_base64
            .ok_or_else(|| Error::parse_error("Envelope carries no audio_base64"))?;
        let bytes = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| Error::parse_error(format!("Invalid audio_base64: {e}")))?;
        Ok(SpeechAudio {
            bytes: bytes.into(),
            content_type: envelope
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        })
    }

    /// A poller over this client's video status lookups.
    pub fn task_poller(&self) -> TaskPoller<Self> {
        TaskPoller::new(self.clone())
    }

    /// `{base}/api[/{vendor}]/{segments..}`
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.config.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                Error::configuration(format!("Base URL cannot be a base: {}", self.config.base_url))
            })?;
            path.pop_if_empty().push("api");
            if let Some(vendor) = self.config.provider {
                path.push(vendor.as_str());
            }
            path.extend(segments);
        }
        Ok(url)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<GatewayResponse> {
        let url = self.url(segments)?;
        debug!(%url, "Sending request");
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;
        self.handle_response(response).await
    }

    /// Decode the envelope; anything but `200` with `ok: true` is an error.
    async fn handle_response(&self, response: reqwest::Response) -> Result<GatewayResponse> {
        let status = response.status().as_u16();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = response.bytes().await.map_err(|e| self.map_reqwest_error(e))?;
        let envelope = match serde_json::from_slice::<GatewayResponse>(&body) {
            Ok(envelope) => envelope,
            Err(e) if status == 200 => {
                return Err(Error::parse_error(format!("Malformed envelope: {e}")));
            }
            Err(_) => {
                return Err(Error::Api {
                    status,
                    code: None,
                    message: Some(String::from_utf8_lossy(&body).into_owned())
                        .filter(|m| !m.is_empty()),
                    request_id,
                });
            }
        };

        if status == 200 && envelope.ok {
            return Ok(envelope);
        }

        Err(Error::Api {
            status,
            code: envelope.error.map(|c| c.as_str().to_string()),
            message: envelope.message,
            request_id,
        })
    }

    /// Map a reqwest error to an SDK error.
    fn map_reqwest_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Timeout {
                duration_ms: u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else if error.is_connect() {
            Error::Connection {
                message: error.to_string(),
            }
        } else {
            Error::Http(error)
        }
    }
}

fn data<T: DeserializeOwned>(envelope: GatewayResponse) -> Result<T> {
    let data = envelope
        .data
        .ok_or_else(|| Error::parse_error("Envelope carries no data"))?;
    serde_json::from_value(data).map_err(|e| Error::parse_error(e.to_string()))
}

fn task(envelope: GatewayResponse) -> Result<VideoTask> {
    envelope
        .data
        .as_ref()
        .and_then(VideoTask::from_value)
        .ok_or_else(|| Error::parse_error("Envelope carries no task record"))
}

/// Builder for creating a Client.
#[derive(Debug, Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    api_key: Option<SecretString>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    provider: Option<Vendor>,
    custom_headers: Vec<(String, String)>,
}

impl ClientBuilder {
    /// Create a new client builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(key.into()));
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Route every call to `vendor` instead of the gateway defaults.
    pub fn provider(mut self, vendor: Vendor) -> Self {
        self.provider = Some(vendor);
        self
    }

    /// Add a custom header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client> {
        let raw = self
            .base_url
            .unwrap_or_else(|| ClientConfig::DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&raw)
            .map_err(|e| Error::configuration(format!("Invalid base URL '{raw}': {e}")))?;

        let mut config = ClientConfig::new(base_url);
        config.api_key = self.api_key;
        config.timeout = self.timeout.unwrap_or(ClientConfig::DEFAULT_TIMEOUT);
        config.connect_timeout = self
            .connect_timeout
            .unwrap_or(ClientConfig::DEFAULT_CONNECT_TIMEOUT);
        if let Some(user_agent) = self.user_agent {
            config.user_agent = user_agent;
        }
        config.provider = self.provider;
        config.custom_headers = self.custom_headers;

        Client::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::{ChatMessage, ContentPart, TaskStatus};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> Client {
        Client::builder().base_url(server.uri()).build().unwrap()
    }

    #[test]
    fn test_invalid_base_url() {
        let err = Client::builder().base_url("not a url").build().err().unwrap();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_url_building() {
        let client = Client::builder()
            .base_url("http://gw.test/prefix/")
            .provider(Vendor::VolcTts)
            .build()
            .unwrap();
        assert_eq!(
            client.url(&["speech"]).unwrap().as_str(),
            "http://gw.test/prefix/api/volc-tts/speech"
        );

        let client = Client::builder().base_url("http://gw.test").build().unwrap();
        assert_eq!(
            client.url(&["video", "a/b"]).unwrap().as_str(),
            "http://gw.test/api/video/a%2Fb"
        );
    }

    #[tokio::test]
    async fn test_chat() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({"messages": [{"role": "user", "content": "hi"}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "data": {"choices": [{"message": {"role": "assistant", "content": "hello"}}]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = ChatRequest::builder().message(ChatMessage::user("hi")).build();
        let completion = client(&server).chat(&request).await.unwrap();
        assert_eq!(completion.content(), "hello");
    }

    #[tokio::test]
    async fn test_failure_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/qianfan/chat"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("x-request-id", "req-9")
                    .set_body_json(json!({
                        "ok": false,
                        "error": "QUOTA_EXCEEDED",
                        "message": "quota"
                    })),
            )
            .mount(&server)
            .await;

        let client = Client::builder()
            .base_url(server.uri())
            .provider(Vendor::Qianfan)
            .build()
            .unwrap();
        let err = client.chat(&ChatRequest::default()).await.unwrap_err();
        assert_eq!(err.status_code(), Some(429));
        assert_eq!(err.code(), Some("QUOTA_EXCEEDED"));
        assert_eq!(err.request_id(), Some("req-9"));
    }

    #[tokio::test]
    async fn test_non_envelope_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = client(&server).video_status("cgt-1").await.unwrap_err();
        assert_eq!(err.status_code(), Some(502));
        assert!(err.code().is_none());
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server).video_status("cgt-1").await.unwrap_err();
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[tokio::test]
    async fn test_video_lifecycle_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/video"))
            .and(body_partial_json(json!({"content": [{"type": "text", "text": "a cat"}]})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"ok": true, "data": {"id": "cgt-1"}})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/video/cgt-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "data": {"id": "cgt-1", "status": "succeeded", "content": {"video_url": "https://v/1.mp4"}}
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let created = client
            .create_video(&VideoCreateRequest::new(vec![ContentPart::text("a cat")]))
            .await
            .unwrap();
        assert_eq!(created.id, "cgt-1");
        assert!(created.status.is_none());

        let task = client.video_status("cgt-1").await.unwrap();
        assert_eq!(task.status, Some(TaskStatus::Succeeded));
        assert_eq!(task.video_url(), Some("https://v/1.mp4"));
    }

    #[tokio::test]
    async fn test_speech_decodes_audio() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/speech"))
            .and(header("user-agent", ClientConfig::DEFAULT_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "audio_base64": "SUQz",
                "content_type": "audio/mpeg"
            })))
            .mount(&server)
            .await;

        let audio = client(&server).speech(&SpeechRequest::new("hello")).await.unwrap();
        assert_eq!(&audio.bytes[..], b"ID3");
        assert_eq!(audio.content_type, "audio/mpeg");
    }
}
