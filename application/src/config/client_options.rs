//! Client options: how the façade issues calls.

use sb_domain::{CallTimeout, DEFAULT_CALL_TIMEOUT, DEFAULT_CLIENT_NAME};
use std::time::Duration;

/// Options for [`MiddlewareClient`](crate::client::MiddlewareClient).
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    /// Display name sent with greetings and chat requests.
    pub client_name: String,
    /// Bound for quick unary calls (`SayHello`, `GetClientConfig`, ...).
    pub call_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

impl ClientOptions {
    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Policy for calls expected to return promptly.
    pub fn bounded(&self) -> CallTimeout {
        CallTimeout::Bounded(self.call_timeout)
    }
}
