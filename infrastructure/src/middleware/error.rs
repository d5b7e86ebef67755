//! Error types for the middleware adapter

use sb_application::ports::middleware_gateway::GatewayError;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for middleware channel operations
pub type Result<T> = std::result::Result<T, MiddlewareError>;

/// Errors that can occur when communicating with the middleware
#[derive(Error, Debug)]
pub enum MiddlewareError {
    #[error("Failed to connect to {address}: {message}")]
    ConnectError { address: String, message: String },

    #[error("Invalid middleware address '{address}': {message}")]
    InvalidAddress { address: String, message: String },

    #[error("TLS setup failed: {0}")]
    TlsError(String),

    #[error("gRPC status {code:?}: {message}")]
    Status { code: tonic::Code, message: String },

    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Session closed")]
    SessionClosed,
}

impl From<tonic::Status> for MiddlewareError {
    fn from(status: tonic::Status) -> Self {
        MiddlewareError::Status {
            code: status.code(),
            message: status.message().to_string(),
        }
    }
}

impl MiddlewareError {
    /// Translate into the port-level error for a failed `operation`.
    pub fn into_gateway(self, operation: &str) -> GatewayError {
        match self {
            MiddlewareError::ConnectError { .. }
            | MiddlewareError::InvalidAddress { .. }
            | MiddlewareError::TlsError(_) => GatewayError::ConnectionError(self.to_string()),
            MiddlewareError::SessionClosed => GatewayError::TransportClosed,
            MiddlewareError::Timeout(after) => GatewayError::Timeout {
                operation: operation.to_string(),
                after,
            },
            // The channel could not reach the middleware at all
            MiddlewareError::Status {
                code: tonic::Code::Unavailable,
                message,
            } => GatewayError::ConnectionError(message),
            MiddlewareError::Status { code, message } => GatewayError::Rejected {
                operation: operation.to_string(),
                code: code as i64,
                message,
            },
        }
    }
}
