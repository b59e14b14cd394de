//! Configuration errors.

use std::path::PathBuf;

/// Errors raised while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for this schema
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_yaml::Error,
    },

    /// An environment override has an unusable value
    #[error("Invalid value for {name}: {value}")]
    InvalidEnv {
        /// Variable name
        name: String,
        /// Offending value
        value: String,
    },

    /// A setting failed validation
    #[error("Invalid configuration: {field}: {reason}")]
    Invalid {
        /// Dotted path of the setting
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

impl ConfigError {
    /// Create a validation error
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
