//! Integration tests for the generation gateway
//!
//! A real gateway listens on a loopback port, wired to wiremock upstreams,
//! and is driven through the SDK client and raw HTTP:
//! - chat, image, video and speech flows
//! - validation rejections that never reach an upstream
//! - video task polling to completion

pub mod helpers;
pub mod mock_providers;

// Re-export commonly used items
pub use helpers::*;
pub use mock_providers::*;

#[cfg(test)]
mod e2e_tests;
