//! Client configuration from TOML (`[client]` section)

use sb_application::ClientOptions;
use sb_domain::DEFAULT_CLIENT_NAME;
use serde::{Deserialize, Serialize};

/// Raw client configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileClientConfig {
    /// Display name sent with greetings and chat requests
    pub name: String,
}

impl Default for FileClientConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_CLIENT_NAME.to_string(),
        }
    }
}

impl FileClientConfig {
    pub fn client_options(&self, call_timeout: std::time::Duration) -> ClientOptions {
        ClientOptions::default()
            .with_client_name(self.name.clone())
            .with_call_timeout(call_timeout)
    }
}
