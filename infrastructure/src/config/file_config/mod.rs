//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod client;
mod connection;
mod output;

pub use client::FileClientConfig;
pub use connection::FileConnectionConfig;
pub use output::FileOutputConfig;

use sb_domain::GenerationParameters;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during configuration validation
#[derive(Error, Debug, PartialEq)]
pub enum ConfigValidationError {
    #[error("connection.timeout_secs cannot be 0")]
    InvalidTimeout,

    #[error("connection.address cannot be empty")]
    EmptyAddress,

    #[error("connection.tls requires connection.ca_path")]
    MissingCaPath,

    #[error("client.name cannot be empty")]
    EmptyClientName,

    #[error("invalid [parameters]: {0}")]
    InvalidParameters(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Where and how to reach the middleware
    pub connection: FileConnectionConfig,
    /// Client identity
    pub client: FileClientConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Generation parameters pushed with `SetParameters`
    pub parameters: GenerationParameters,
}

impl FileConfig {
    /// Validate the configuration values
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.connection.timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.connection.address.trim().is_empty() {
            return Err(ConfigValidationError::EmptyAddress);
        }
        if self.connection.tls && self.connection.ca_path.is_none() {
            return Err(ConfigValidationError::MissingCaPath);
        }
        if self.client.name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyClientName);
        }
        self.parameters
            .validate()
            .map_err(|e| ConfigValidationError::InvalidParameters(e.to_string()))
    }
}
