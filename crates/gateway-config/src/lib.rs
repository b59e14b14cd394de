//! # Gateway Config
//!
//! Configuration for the Generation Gateway: a typed schema with defaults,
//! an optional YAML file, environment overrides and validation.
//!
//! Secrets are held as [`secrecy::SecretString`] and never appear in
//! `Debug` output or in [`ConfigSummary`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod model;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_from_file, CONFIG_PATH_ENV};
pub use model::{
    ConfigSummary, CorsSettings, DefaultProviders, DoubaoSettings, GatewayConfig,
    LoggingSettings, QianfanSettings, QuotaSettings, ServerSettings, TtsSettings,
    UpstreamSettings,
};
