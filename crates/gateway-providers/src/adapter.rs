//! Per-capability payload adapters.
//!
//! Each adapter sanitizes and validates a request and renders the provider
//! wire body. Validation fails before any network activity. Optional fields
//! are written only when the caller supplied them with the right type.

use gateway_core::{
    ChatRequest, ErrorCode, GatewayError, GatewayResult, ImageRequest, RequestSanitizer,
    SpeechRequest, VideoCreateRequest, VideoStatusRequest,
};
use serde_json::{Map, Number, Value};
use url::Url;

/// Image size used when the caller names none
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";
/// Image response format used when the caller names none
pub const DEFAULT_IMAGE_RESPONSE_FORMAT: &str = "url";
/// Speech container used when the caller names none
pub const DEFAULT_AUDIO_FORMAT: &str = "mp3";

/// Render a chat completions body.
pub fn chat_payload(
    sanitizer: &RequestSanitizer,
    request: &ChatRequest,
    default_model: &str,
) -> GatewayResult<Value> {
    if request.messages.is_empty() {
        return Err(GatewayError::validation(
            ErrorCode::MessagesRequired,
            "messages must be a non-empty array",
        ));
    }

    let messages: Vec<Value> = request
        .messages
        .iter()
        .cloned()
        .map(|m| sanitizer.message(m))
        .map(|m| serde_json::to_value(m).unwrap_or(Value::Null))
        .collect();

    let mut body = Map::new();
    body.insert("model".into(), model_value(sanitizer, request.model.as_deref(), default_model));
    body.insert("messages".into(), Value::Array(messages));
    insert_number(&mut body, "max_tokens", request.effective_max_tokens());
    insert_number(&mut body, "temperature", request.temperature.as_ref());
    insert_number(&mut body, "top_p", request.top_p.as_ref());
    if let Some(stream) = request.stream {
        body.insert("stream".into(), Value::Bool(stream));
    }
    Ok(Value::Object(body))
}

/// Render an image generation body.
pub fn image_payload(
    sanitizer: &RequestSanitizer,
    request: &ImageRequest,
    default_model: &str,
) -> GatewayResult<Value> {
    let prompt = request
        .prompt
        .as_deref()
        .map(|p| sanitizer.text(p))
        .filter(|p| !p.is_empty())
        .ok_or_else(|| {
            GatewayError::validation(ErrorCode::PromptRequired, "prompt must be a non-empty string")
        })?;

    let mut body = Map::new();
    body.insert("model".into(), model_value(sanitizer, request.model.as_deref(), default_model));
    body.insert("prompt".into(), Value::String(prompt));
    body.insert(
        "size".into(),
        Value::String(or_default(sanitizer, request.size.as_deref(), DEFAULT_IMAGE_SIZE)),
    );
    body.insert(
        "n".into(),
        Value::Number(request.n.clone().unwrap_or_else(|| Number::from(1))),
    );
    body.insert(
        "response_format".into(),
        Value::String(or_default(
            sanitizer,
            request.response_format.as_deref(),
            DEFAULT_IMAGE_RESPONSE_FORMAT,
        )),
    );
    insert_number(&mut body, "seed", request.seed.as_ref());
    insert_number(&mut body, "guidance_scale", request.guidance_scale.as_ref());
    if let Some(watermark) = request.watermark {
        body.insert("watermark".into(), Value::Bool(watermark));
    }
    Ok(Value::Object(body))
}

/// Render a video task creation body.
pub fn video_payload(
    sanitizer: &RequestSanitizer,
    request: &VideoCreateRequest,
    default_model: &str,
) -> GatewayResult<Value> {
    if request.content.is_empty() {
        return Err(GatewayError::validation(
            ErrorCode::ContentRequired,
            "content must be a non-empty array",
        ));
    }

    let content: Vec<Value> = sanitizer
        .content_parts(request.content.clone())
        .into_iter()
        .map(Value::from)
        .collect();

    let mut body = Map::new();
    body.insert("model".into(), model_value(sanitizer, request.model.as_deref(), default_model));
    body.insert("content".into(), Value::Array(content));
    Ok(Value::Object(body))
}

/// Build the task status URL: `base` with the task id appended as one path segment.
pub fn video_status_url(
    sanitizer: &RequestSanitizer,
    base: &str,
    request: &VideoStatusRequest,
) -> GatewayResult<String> {
    let id = sanitizer.text(&request.id);
    if id.is_empty() {
        return Err(GatewayError::validation(
            ErrorCode::IdRequired,
            "task id must be a non-empty string",
        ));
    }

    let mut url = Url::parse(base)
        .map_err(|e| GatewayError::internal(format!("Invalid task endpoint {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| GatewayError::internal(format!("Task endpoint cannot have a path: {base}")))?
        .pop_if_empty()
        .push(&id);
    Ok(url.into())
}

/// Render a speech synthesis body.
pub fn speech_payload(
    sanitizer: &RequestSanitizer,
    request: &SpeechRequest,
    default_voice: &str,
) -> GatewayResult<Value> {
    let text = sanitizer.speech_text(&request.text)?;

    let mut body = Map::new();
    body.insert("text".into(), Value::String(text));
    body.insert(
        "voice".into(),
        Value::String(or_default(sanitizer, request.voice.as_deref(), default_voice)),
    );
    body.insert("speed".into(), number_or_one(request.speed.as_ref()));
    body.insert("pitch".into(), number_or_one(request.pitch.as_ref()));
    body.insert(
        "audio_format".into(),
        Value::String(or_default(sanitizer, request.format.as_deref(), DEFAULT_AUDIO_FORMAT)),
    );
    Ok(Value::Object(body))
}

fn model_value(sanitizer: &RequestSanitizer, requested: Option<&str>, default: &str) -> Value {
    Value::String(or_default(sanitizer, requested, default))
}

fn or_default(sanitizer: &RequestSanitizer, value: Option<&str>, default: &str) -> String {
    value
        .map(|v| sanitizer.text(v))
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn insert_number(body: &mut Map<String, Value>, key: &str, value: Option<&Number>) {
    if let Some(n) = value {
        body.insert(key.to_string(), Value::Number(n.clone()));
    }
}

fn number_or_one(value: Option<&Number>) -> Value {
    value
        .cloned()
        .or_else(|| Number::from_f64(1.0))
        .map_or(Value::Null, Value::Number)
}
