//! Request types for the gateway.
//!
//! Inbound bodies are arbitrary JSON. Each capability reads the fields it knows
//! with lenient accessors: a field of the wrong type is treated as absent rather
//! than rejected, so it is never forwarded upstream.

use crate::types::Capability;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// A generation request, discriminated by capability.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GenerationRequest {
    /// Chat completion
    Chat(ChatRequest),
    /// Image generation
    Image(ImageRequest),
    /// Video task creation
    VideoCreate(VideoCreateRequest),
    /// Video task status lookup
    VideoStatus(VideoStatusRequest),
    /// Speech synthesis
    Speech(SpeechRequest),
}

impl GenerationRequest {
    /// Read a request for `capability` from an inbound JSON body.
    ///
    /// `task_id` is the path parameter of the video-status route and is ignored
    /// for every other capability.
    #[must_use]
    pub fn from_body(capability: Capability, body: &Value, task_id: Option<&str>) -> Self {
        match capability {
            Capability::Chat => Self::Chat(ChatRequest::from_value(body)),
            Capability::Image => Self::Image(ImageRequest::from_value(body)),
            Capability::VideoCreate => Self::VideoCreate(VideoCreateRequest::from_value(body)),
            Capability::VideoStatus => Self::VideoStatus(VideoStatusRequest::new(
                task_id.unwrap_or_default(),
            )),
            Capability::Speech => Self::Speech(SpeechRequest::from_value(body)),
        }
    }

    /// Capability this request targets
    #[must_use]
    pub fn capability(&self) -> Capability {
        match self {
            Self::Chat(_) => Capability::Chat,
            Self::Image(_) => Capability::Image,
            Self::VideoCreate(_) => Capability::VideoCreate,
            Self::VideoStatus(_) => Capability::VideoStatus,
            Self::Speech(_) => Capability::Speech,
        }
    }

    /// Caller's model override, if any
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        match self {
            Self::Chat(r) => r.model.as_deref(),
            Self::Image(r) => r.model.as_deref(),
            Self::VideoCreate(r) => r.model.as_deref(),
            Self::VideoStatus(_) | Self::Speech(_) => None,
        }
    }
}

/// Chat completion request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChatRequest {
    /// Model override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Conversation messages
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Number>,

    /// Nucleus sampling parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<Number>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<Number>,

    /// Alternative spelling of `max_tokens` used by newer clients
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<Number>,

    /// Streaming flag, forwarded as-is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl ChatRequest {
    /// Create a new builder for `ChatRequest`
    #[must_use]
    pub fn builder() -> ChatRequestBuilder {
        ChatRequestBuilder::default()
    }

    /// Read a chat request from a JSON body
    #[must_use]
    pub fn from_value(body: &Value) -> Self {
        let messages = body
            .get("messages")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(ChatMessage::from_value).collect())
            .unwrap_or_default();

        Self {
            model: string_field(body, "model"),
            messages,
            temperature: number_field(body, "temperature"),
            top_p: number_field(body, "top_p"),
            max_tokens: number_field(body, "max_tokens"),
            max_completion_tokens: number_field(body, "max_completion_tokens"),
            stream: body.get("stream").and_then(Value::as_bool),
        }
    }

    /// Token limit to forward: `max_tokens` wins over `max_completion_tokens`
    #[must_use]
    pub fn effective_max_tokens(&self) -> Option<&Number> {
        self.max_tokens.as_ref().or(self.max_completion_tokens.as_ref())
    }
}

/// Builder for `ChatRequest`
#[derive(Debug, Default)]
pub struct ChatRequestBuilder {
    request: ChatRequest,
}

impl ChatRequestBuilder {
    /// Set the model
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.request.model = Some(model.into());
        self
    }

    /// Add a message
    #[must_use]
    pub fn message(mut self, message: ChatMessage) -> Self {
        self.request.messages.push(message);
        self
    }

    /// Set the temperature
    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.request.temperature = Number::from_f64(temperature);
        self
    }

    /// Set top_p
    #[must_use]
    pub fn top_p(mut self, top_p: f64) -> Self {
        self.request.top_p = Number::from_f64(top_p);
        self
    }

    /// Set max_tokens
    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.request.max_tokens = Some(Number::from(max_tokens));
        self
    }

    /// Build the request
    #[must_use]
    pub fn build(self) -> ChatRequest {
        self.request
    }
}

/// Chat message with role and content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role (`user` when the caller omits it)
    pub role: String,
    /// Message content
    pub content: MessageContent,
}

impl ChatMessage {
    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a user message with multimodal parts
    #[must_use]
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Parts(parts),
        }
    }

    /// Read a message leniently from JSON
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let role = value
            .get("role")
            .and_then(Value::as_str)
            .filter(|r| !r.trim().is_empty())
            .unwrap_or("user")
            .to_string();

        let content = match value.get("content") {
            Some(Value::Array(parts)) => {
                MessageContent::Parts(parts.iter().cloned().map(ContentPart::from).collect())
            }
            other => MessageContent::Text(coerce_to_string(other)),
        };

        Self { role, content }
    }
}

/// Message content (text or multimodal parts)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text content
    Text(String),
    /// Multimodal content parts
    Parts(Vec<ContentPart>),
}

/// Content part for multimodal chat messages and video task content.
///
/// `text` and `image_url` parts are recognized; anything else is carried
/// through unchanged. Extra keys on recognized parts are preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum ContentPart {
    /// Text content part
    Text {
        /// The text content
        text: String,
        /// Other keys on the part object
        extra: Map<String, Value>,
    },
    /// Image reference part
    ImageUrl {
        /// Image URL (`image_url.url`)
        url: String,
        /// Other keys on the nested `image_url` object
        image_extra: Map<String, Value>,
        /// Other keys on the part object
        extra: Map<String, Value>,
    },
    /// Unrecognized part, forwarded verbatim
    Other(Value),
}

impl ContentPart {
    /// Create a text part
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            extra: Map::new(),
        }
    }

    /// Create an image URL part
    #[must_use]
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            url: url.into(),
            image_extra: Map::new(),
            extra: Map::new(),
        }
    }
}

impl From<Value> for ContentPart {
    fn from(value: Value) -> Self {
        let Value::Object(mut obj) = value else {
            return Self::Other(value);
        };

        match obj.get("type").and_then(Value::as_str) {
            Some("text") if obj.get("text").is_some_and(Value::is_string) => {
                obj.remove("type");
                let text = match obj.remove("text") {
                    Some(Value::String(s)) => s,
                    _ => String::new(),
                };
                Self::Text { text, extra: obj }
            }
            Some("image_url")
                if obj
                    .get("image_url")
                    .and_then(|i| i.get("url"))
                    .is_some_and(Value::is_string) =>
            {
                obj.remove("type");
                let mut image_extra = match obj.remove("image_url") {
                    Some(Value::Object(inner)) => inner,
                    _ => Map::new(),
                };
                let url = match image_extra.remove("url") {
                    Some(Value::String(s)) => s,
                    _ => String::new(),
                };
                Self::ImageUrl {
                    url,
                    image_extra,
                    extra: obj,
                }
            }
            _ => Self::Other(Value::Object(obj)),
        }
    }
}

impl From<ContentPart> for Value {
    fn from(part: ContentPart) -> Self {
        match part {
            ContentPart::Text { text, mut extra } => {
                extra.insert("type".to_string(), Value::from("text"));
                extra.insert("text".to_string(), Value::String(text));
                Value::Object(extra)
            }
            ContentPart::ImageUrl {
                url,
                mut image_extra,
                mut extra,
            } => {
                image_extra.insert("url".to_string(), Value::String(url));
                extra.insert("type".to_string(), Value::from("image_url"));
                extra.insert("image_url".to_string(), Value::Object(image_extra));
                Value::Object(extra)
            }
            ContentPart::Other(value) => value,
        }
    }
}

/// Image generation request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageRequest {
    /// Model override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Text prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Output size, e.g. `1024x1024`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Number of images
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<Number>,
    /// `url` or `b64_json`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,
    /// Seed for reproducible output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<Number>,
    /// Prompt adherence strength
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance_scale: Option<Number>,
    /// Whether the provider should watermark the image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark: Option<bool>,
}

impl ImageRequest {
    /// Create a request for `prompt`
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Self::default()
        }
    }

    /// Read an image request from a JSON body
    #[must_use]
    pub fn from_value(body: &Value) -> Self {
        Self {
            model: string_field(body, "model"),
            prompt: body.get("prompt").and_then(Value::as_str).map(String::from),
            size: string_field(body, "size"),
            n: number_field(body, "n"),
            response_format: string_field(body, "response_format"),
            seed: number_field(body, "seed"),
            guidance_scale: number_field(body, "guidance_scale"),
            watermark: body.get("watermark").and_then(Value::as_bool),
        }
    }
}

/// Video task creation request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoCreateRequest {
    /// Model override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Prompt and reference image parts
    pub content: Vec<ContentPart>,
}

impl VideoCreateRequest {
    /// Create a request from content parts
    #[must_use]
    pub fn new(content: Vec<ContentPart>) -> Self {
        Self {
            model: None,
            content,
        }
    }

    /// Read a video request from a JSON body
    #[must_use]
    pub fn from_value(body: &Value) -> Self {
        let content = body
            .get("content")
            .and_then(Value::as_array)
            .map(|parts| parts.iter().cloned().map(ContentPart::from).collect())
            .unwrap_or_default();

        Self {
            model: string_field(body, "model"),
            content,
        }
    }
}

/// Video task status lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VideoStatusRequest {
    /// Provider task identifier
    pub id: String,
}

impl VideoStatusRequest {
    /// Create a lookup for `id`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Speech synthesis request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpeechRequest {
    /// Text to synthesize
    pub text: String,
    /// Voice identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    /// Speaking rate multiplier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<Number>,
    /// Pitch multiplier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<Number>,
    /// Audio container, e.g. `mp3`
    #[serde(rename = "audio_format", skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl SpeechRequest {
    /// Create a request for `text`
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Read a speech request from a JSON body
    #[must_use]
    pub fn from_value(body: &Value) -> Self {
        Self {
            text: body
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            voice: string_field(body, "voice"),
            speed: number_field(body, "speed"),
            pitch: number_field(body, "pitch"),
            format: string_field(body, "audio_format").or_else(|| string_field(body, "format")),
        }
    }
}

/// Non-empty string field
fn string_field(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(String::from)
}

fn number_field(body: &Value, key: &str) -> Option<Number> {
    match body.get(key) {
        Some(Value::Number(n)) => Some(n.clone()),
        _ => None,
    }
}

/// String coercion for non-array message content
pub(crate) fn coerce_to_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
