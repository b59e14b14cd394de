//! # Gateway Server
//!
//! HTTP surface for the Generation Gateway.
//!
//! This crate provides:
//! - Axum routes for chat, image, video task and speech requests
//! - The uniform JSON envelope on every response
//! - CORS preflight handling and request correlation ids
//! - Health and Prometheus metrics endpoints
//! - Graceful shutdown handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod state;

// Re-export main types
pub use error::{ApiError, ApiResponse};
pub use health::{HealthResponse, ProviderHealth};
pub use routes::create_router;
pub use server::{serve, Server, ServerConfig, ServerError};
pub use shutdown::shutdown_signal;
pub use state::{AppState, AppStateBuilder};
