//! Video generation task records as reported by the provider.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle state of an asynchronous video task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Accepted, not started
    Queued,
    /// Rendering
    Running,
    /// Finished with a result
    Succeeded,
    /// Finished without a result
    Failed,
    /// Cancelled by the caller or provider
    Cancelled,
    /// Any status string this gateway does not know
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Parse a provider status string; unknown values map to [`TaskStatus::Unknown`]
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "queued" | "pending" => Self::Queued,
            "running" | "processing" => Self::Running,
            "succeeded" | "success" => Self::Succeeded,
            "failed" | "error" => Self::Failed,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }

    /// Whether polling should stop at this status
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

/// Output locations of a finished video task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoContent {
    /// Rendered video
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Last frame still
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_frame_url: Option<String>,
}

/// Provider task record returned by create and status lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoTask {
    /// Task identifier
    pub id: String,
    /// Current status; absent on the create response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Output, once succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<VideoContent>,
    /// Provider error detail, once failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl VideoTask {
    /// Read a task record from provider JSON, tolerating unknown fields
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = value.get("id").and_then(Value::as_str)?.to_string();
        let status = value
            .get("status")
            .and_then(Value::as_str)
            .map(TaskStatus::parse);
        let content = value
            .get("content")
            .and_then(|c| serde_json::from_value::<VideoContent>(c.clone()).ok());
        let error = value.get("error").filter(|e| !e.is_null()).cloned();

        Some(Self {
            id,
            status,
            content,
            error,
        })
    }

    /// Whether the task reached a final state
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.as_ref().is_some_and(TaskStatus::is_terminal)
    }

    /// Rendered video URL, when available
    #[must_use]
    pub fn video_url(&self) -> Option<&str> {
        self.content.as_ref()?.video_url.as_deref()
    }
}
