//! Typed views of envelope payloads.

use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;

/// Chat completion as returned by the provider.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatCompletion {
    /// Completion ID.
    pub id: Option<String>,
    /// Model that answered.
    pub model: Option<String>,
    /// Completion choices.
    pub choices: Vec<ChatChoice>,
    /// Token usage.
    pub usage: Option<Usage>,
}

impl ChatCompletion {
    /// Text of the first choice, or empty.
    pub fn content(&self) -> &str {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .unwrap_or_default()
    }
}

/// A completion choice.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatChoice {
    /// Choice index.
    pub index: u32,
    /// Generated message.
    pub message: Option<ChoiceMessage>,
    /// Why generation stopped.
    pub finish_reason: Option<String>,
}

/// Generated message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChoiceMessage {
    /// Message role.
    pub role: Option<String>,
    /// Message text.
    pub content: Option<String>,
}

/// Token usage.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct Usage {
    /// Prompt tokens.
    pub prompt_tokens: u32,
    /// Completion tokens.
    pub completion_tokens: u32,
    /// Total tokens.
    pub total_tokens: u32,
}

/// Image generation result.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageGeneration {
    /// Generated images.
    pub data: Vec<GeneratedImage>,
    /// Provider-specific fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ImageGeneration {
    /// URLs of the generated images.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.data.iter().filter_map(|i| i.url.as_deref())
    }
}

/// One generated image.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneratedImage {
    /// Hosted image URL.
    pub url: Option<String>,
    /// Inline base64 image.
    pub b64_json: Option<String>,
}

/// Synthesized audio.
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    /// Decoded audio bytes.
    pub bytes: Bytes,
    /// Audio MIME type, e.g. `audio/mpeg`.
    pub content_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_content() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "id": "chat-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "hi"}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4},
            "object": "chat.completion"
        }))
        .unwrap();
        assert_eq!(completion.content(), "hi");
        assert_eq!(completion.usage.map(|u| u.total_tokens), Some(4));
        assert_eq!(ChatCompletion::default().content(), "");
    }

    #[test]
    fn test_image_urls() {
        let images: ImageGeneration = serde_json::from_value(json!({
            "created": 1,
            "data": [{"url": "https://img/a.png"}, {"b64_json": "AAAA"}]
        }))
        .unwrap();
        assert_eq!(images.urls().collect::<Vec<_>>(), vec!["https://img/a.png"]);
        assert_eq!(images.extra["created"], 1);
    }
}
