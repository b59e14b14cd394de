//! # Gateway Core
//!
//! Core types, traits, and error handling for the Generation Gateway.
//!
//! This crate provides the foundational types used throughout the gateway:
//! - Capability and provider identifiers
//! - Inbound request types and sanitization
//! - The uniform response envelope and error codes
//! - The `Provider` trait every vendor integration implements

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clock;
pub mod error;
pub mod provider;
pub mod request;
pub mod response;
pub mod sanitize;
pub mod task;
pub mod types;
pub mod upstream;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ErrorCode, GatewayError, GatewayResult};
pub use provider::Provider;
pub use request::{
    ChatMessage, ChatRequest, ChatRequestBuilder, ContentPart, GenerationRequest, ImageRequest,
    MessageContent, SpeechRequest, VideoCreateRequest, VideoStatusRequest,
};
pub use response::GatewayResponse;
pub use sanitize::{RequestSanitizer, MAX_SPEECH_CHARS};
pub use task::{TaskStatus, VideoContent, VideoTask};
pub use types::{Capability, ProviderKind, Vendor};
pub use upstream::{UpstreamBody, UpstreamMethod, UpstreamRequest, UpstreamResult};
