//! # Gateway Telemetry
//!
//! Observability for the Generation Gateway.
//!
//! This crate provides:
//! - Structured logging on `tracing-subscriber` (pretty or JSON)
//! - Prometheus metrics for requests, upstream latency and token exchanges

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod logging;
pub mod metrics;

// Re-export main types
pub use logging::{init_logging, LogFormat, LoggingConfig, LoggingError};
pub use metrics::{GatewayMetrics, MetricsError};
