//! Input sanitization applied before any payload reaches a provider.
//!
//! Free text and URLs lose backtick characters and surrounding whitespace.
//! Speech text is additionally bounded in length.

use crate::error::{ErrorCode, GatewayError, GatewayResult};
use crate::request::{ChatMessage, ContentPart, MessageContent};

/// Default ceiling for synthesized speech text, in characters.
pub const MAX_SPEECH_CHARS: usize = 2000;

/// Pure transform over request fields.
#[derive(Debug, Clone, Copy)]
pub struct RequestSanitizer {
    max_speech_chars: usize,
}

impl Default for RequestSanitizer {
    fn default() -> Self {
        Self {
            max_speech_chars: MAX_SPEECH_CHARS,
        }
    }
}

impl RequestSanitizer {
    /// Create a sanitizer with the default speech ceiling
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the speech length ceiling
    #[must_use]
    pub fn with_max_speech_chars(mut self, max: usize) -> Self {
        self.max_speech_chars = max;
        self
    }

    /// Current speech length ceiling
    #[must_use]
    pub fn max_speech_chars(&self) -> usize {
        self.max_speech_chars
    }

    /// Strip backticks and trim surrounding whitespace
    #[must_use]
    pub fn text(&self, input: &str) -> String {
        input.replace('`', "").trim().to_string()
    }

    /// Sanitize one content part; unrecognized parts are returned unchanged
    #[must_use]
    pub fn content_part(&self, part: ContentPart) -> ContentPart {
        match part {
            ContentPart::Text { text, extra } => ContentPart::Text {
                text: self.text(&text),
                extra,
            },
            ContentPart::ImageUrl {
                url,
                image_extra,
                extra,
            } => ContentPart::ImageUrl {
                url: self.text(&url),
                image_extra,
                extra,
            },
            other @ ContentPart::Other(_) => other,
        }
    }

    /// Sanitize every part of a content array
    #[must_use]
    pub fn content_parts(&self, parts: Vec<ContentPart>) -> Vec<ContentPart> {
        parts.into_iter().map(|p| self.content_part(p)).collect()
    }

    /// Sanitize a chat message's content
    #[must_use]
    pub fn message(&self, message: ChatMessage) -> ChatMessage {
        let content = match message.content {
            MessageContent::Text(text) => MessageContent::Text(self.text(&text)),
            MessageContent::Parts(parts) => MessageContent::Parts(self.content_parts(parts)),
        };
        ChatMessage {
            role: message.role,
            content,
        }
    }

    /// Sanitize and bound speech text.
    ///
    /// Fails with `TEXT_EMPTY` when nothing remains after trimming and with
    /// `TEXT_TOO_LONG` when the trimmed text exceeds the ceiling.
    pub fn speech_text(&self, input: &str) -> GatewayResult<String> {
        let text = self.text(input);
        if text.is_empty() {
            return Err(GatewayError::validation(
                ErrorCode::TextEmpty,
                "text must not be empty",
            ));
        }

        let chars = text.chars().count();
        if chars > self.max_speech_chars {
            return Err(GatewayError::validation(
                ErrorCode::TextTooLong,
                format!(
                    "text is {chars} characters, limit is {}",
                    self.max_speech_chars
                ),
            ));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_text_strips_backticks_and_whitespace() {
        let s = RequestSanitizer::new();
        assert_eq!(s.text("  `hi`  "), "hi");
        assert_eq!(s.text("a`b`c"), "abc");
        assert_eq!(s.text("\n\t``\n"), "");
    }

    #[test]
    fn test_content_parts() {
        let s = RequestSanitizer::new();
        let parts: Vec<ContentPart> = vec![
            ContentPart::from(json!({"type": "text", "text": " `draw a cat` "})),
            ContentPart::from(json!({"type": "image_url", "image_url": {"url": " `https://x/y.png` "}})),
            ContentPart::from(json!({"type": "audio", "data": " `raw` "})),
        ];

        let out: Vec<Value> = s.content_parts(parts).into_iter().map(Value::from).collect();
        assert_eq!(out[0]["text"], "draw a cat");
        assert_eq!(out[1]["image_url"]["url"], "https://x/y.png");
        assert_eq!(out[2]["data"], " `raw` ");
    }

    #[test]
    fn test_message_plain_text() {
        let s = RequestSanitizer::new();
        let msg = s.message(ChatMessage::user(" ```code``` "));
        assert_eq!(msg.content, MessageContent::Text("code".to_string()));
    }

    #[test]
    fn test_speech_text_bounds() {
        let s = RequestSanitizer::new();
        assert_eq!(s.speech_text("  hello ").expect("valid"), "hello");

        let err = s.speech_text(" `` ").expect_err("empty");
        assert_eq!(err.code(), ErrorCode::TextEmpty);

        let at_limit = "a".repeat(MAX_SPEECH_CHARS);
        assert!(s.speech_text(&at_limit).is_ok());

        let over = "a".repeat(MAX_SPEECH_CHARS + 1);
        let err = s.speech_text(&over).expect_err("too long");
        assert_eq!(err.code(), ErrorCode::TextTooLong);
    }

    #[test]
    fn test_speech_limit_counts_characters() {
        let s = RequestSanitizer::new().with_max_speech_chars(3);
        assert!(s.speech_text("你好吗").is_ok());
        assert!(s.speech_text("你好吗?").is_err());
    }
}
