//! Identifiers shared across the gateway: capabilities and provider kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A distinct kind of generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Chat completions
    Chat,
    /// Text-to-image generation
    Image,
    /// Creation of an asynchronous video generation task
    VideoCreate,
    /// Status lookup for a video generation task
    VideoStatus,
    /// Speech synthesis
    Speech,
}

impl Capability {
    /// All capabilities, in routing order
    pub const ALL: [Self; 5] = [
        Self::Chat,
        Self::Image,
        Self::VideoCreate,
        Self::VideoStatus,
        Self::Speech,
    ];

    /// Wire name used in logs and metrics labels
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Image => "image",
            Self::VideoCreate => "video-create",
            Self::VideoStatus => "video-status",
            Self::Speech => "speech",
        }
    }

    /// Whether the capability is served over GET rather than POST
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(self, Self::VideoStatus)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete upstream vendor integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Multimodal vendor: chat completions
    DoubaoChat,
    /// Multimodal vendor: image generation
    DoubaoImage,
    /// Multimodal vendor: video generation tasks
    DoubaoVideo,
    /// Enterprise LLM vendor with credential exchange
    Qianfan,
    /// Text-to-speech vendor
    VolcTts,
}

impl ProviderKind {
    /// Identifier used in logs and metrics labels
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DoubaoChat => "doubao-chat",
            Self::DoubaoImage => "doubao-image",
            Self::DoubaoVideo => "doubao-video",
            Self::Qianfan => "qianfan",
            Self::VolcTts => "volc-tts",
        }
    }

    /// Vendor name as it appears in route paths
    #[must_use]
    pub const fn vendor(self) -> Vendor {
        match self {
            Self::DoubaoChat | Self::DoubaoImage | Self::DoubaoVideo => Vendor::Doubao,
            Self::Qianfan => Vendor::Qianfan,
            Self::VolcTts => Vendor::VolcTts,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vendor selector used in `/api/:provider/...` routes.
///
/// One vendor may back several [`ProviderKind`]s (one per capability).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Vendor {
    /// Multimodal chat/image/video vendor
    Doubao,
    /// Enterprise LLM vendor
    Qianfan,
    /// Text-to-speech vendor
    VolcTts,
}

impl Vendor {
    /// Path segment for this vendor
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Doubao => "doubao",
            Self::Qianfan => "qianfan",
            Self::VolcTts => "volc-tts",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vendor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "doubao" | "ark" => Ok(Self::Doubao),
            "qianfan" => Ok(Self::Qianfan),
            "volc-tts" | "volctts" | "tts" => Ok(Self::VolcTts),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}
