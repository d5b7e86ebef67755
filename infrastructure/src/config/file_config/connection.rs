//! Connection configuration from TOML (`[connection]` section)

use crate::middleware::session::{DEFAULT_ADDRESS, SecurityMode, SessionOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Raw connection configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConnectionConfig {
    /// Middleware address (`host:port`)
    pub address: String,
    /// Use TLS instead of plain TCP
    pub tls: bool,
    /// PEM CA bundle used to verify the middleware (required with `tls`)
    pub ca_path: Option<PathBuf>,
    /// TLS server name, defaults to the host part of `address`
    pub server_name: Option<String>,
    /// Bound for connecting and for quick calls, in seconds
    pub timeout_secs: u64,
}

impl Default for FileConnectionConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            tls: false,
            ca_path: None,
            server_name: None,
            timeout_secs: sb_domain::DEFAULT_CALL_TIMEOUT.as_secs(),
        }
    }
}

impl FileConnectionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Security mode, `None` when TLS is requested without a CA bundle.
    pub fn security(&self) -> Option<SecurityMode> {
        if !self.tls {
            return Some(SecurityMode::Insecure);
        }
        self.ca_path.as_ref().map(|ca_path| SecurityMode::Tls {
            ca_path: ca_path.clone(),
            server_name: self.server_name.clone(),
        })
    }

    /// Session options for a validated configuration.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions::new(self.address.clone())
            .with_security(self.security().unwrap_or_default())
            .with_connect_timeout(self.timeout())
    }
}
