//! # Generation Gateway SDK
//!
//! A Rust client for the generation gateway.
//!
//! ## Features
//!
//! - Typed calls for chat, image, video task and speech requests
//! - Envelope decoding: any failure envelope or non-200 status is an [`Error`]
//! - [`TaskPoller`], a deterministic poll loop for video tasks
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gateway_sdk::{Client, ContentPart, PollOutcome, VideoCreateRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gateway_sdk::Error> {
//!     let client = Client::builder()
//!         .base_url("http://localhost:8080")
//!         .build()?;
//!
//!     let task = client
//!         .create_video(&VideoCreateRequest::new(vec![ContentPart::text("a cat surfing")]))
//!         .await?;
//!
//!     match client.task_poller().run(&task.id).await? {
//!         PollOutcome::Finished { task, .. } => println!("{:?}", task.video_url()),
//!         PollOutcome::TimedOut { .. } => eprintln!("still rendering"),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod client;
mod config;
mod error;
mod poller;
mod response;

pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use poller::{
    ManualClock, PollClock, PollOutcome, PollState, PollerConfig, TaskPoller, TaskStatusSource,
    TokioClock,
};
pub use response::{
    ChatChoice, ChatCompletion, ChoiceMessage, GeneratedImage, ImageGeneration, SpeechAudio, Usage,
};

// Request and task types shared with the gateway
pub use gateway_core::{
    ChatMessage, ChatRequest, ContentPart, ErrorCode, ImageRequest, MessageContent, SpeechRequest,
    TaskStatus, Vendor, VideoCreateRequest, VideoTask,
};
