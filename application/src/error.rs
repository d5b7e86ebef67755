//! Client error taxonomy
//!
//! Every façade operation returns [`ClientError`]. Gateway and domain errors
//! are translated here so callers match on one enum.

use crate::ports::middleware_gateway::GatewayError;
use sb_domain::{DomainError, ModelRole};
use thiserror::Error;

/// Errors surfaced to callers of the client.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The middleware is unreachable, or the session was closed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A unary call failed or timed out.
    #[error("{operation} failed: {message}")]
    Call { operation: String, message: String },

    #[error("Malformed configuration: {0}")]
    ConfigParse(String),

    #[error("No {role} named '{full_name}' in the model catalog")]
    ModelNotFound { role: ModelRole, full_name: String },

    /// Rejected before anything was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Chat stream failed: {message}")]
    Stream { message: String },

    /// An upload or download reported a failure in its progress stream.
    #[error("{operation} failed: {message}")]
    Transfer { operation: String, message: String },

    /// The stream failed and the follow-up `StopChat` failed too.
    #[error("Chat stream failed: {stream}; stopping the chat also failed: {stop}")]
    StopCall { stream: String, stop: String },
}

impl ClientError {
    /// Translate a gateway failure of `operation`.
    pub fn from_gateway(operation: &str, error: GatewayError) -> Self {
        match error {
            GatewayError::ConnectionError(message) => ClientError::Connection(message),
            GatewayError::TransportClosed => ClientError::Connection("session closed".to_string()),
            other => ClientError::Call {
                operation: operation.to_string(),
                message: other.to_string(),
            },
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, ClientError::Connection(_))
    }

    /// Only connection failures are worth retrying with a fresh session.
    pub fn is_retryable(&self) -> bool {
        self.is_connection()
    }
}

impl From<DomainError> for ClientError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::ConfigParse(message) => ClientError::ConfigParse(message),
            DomainError::ModelNotFound { role, full_name } => {
                ClientError::ModelNotFound { role, full_name }
            }
            DomainError::InvalidFragment(message) => ClientError::Stream { message },
            other @ (DomainError::MissingSelection(_)
            | DomainError::MissingAssistantName
            | DomainError::EmptyPrompt
            | DomainError::InvalidParameter(_)
            | DomainError::Serialization { .. }
            | DomainError::NoFiles
            | DomainError::InvalidPath { .. }
            | DomainError::MissingField(_)) => ClientError::InvalidRequest(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_gateway_connection_maps_to_connection() {
        let error = ClientError::from_gateway("SayHello", GatewayError::TransportClosed);
        assert_eq!(error, ClientError::Connection("session closed".to_string()));
        assert!(error.is_retryable());
    }

    #[test]
    fn test_gateway_timeout_maps_to_call() {
        let error = ClientError::from_gateway(
            "GetClientConfig",
            GatewayError::Timeout {
                operation: "GetClientConfig".to_string(),
                after: Duration::from_secs(30),
            },
        );
        assert!(matches!(
            error,
            ClientError::Call { ref operation, .. } if operation == "GetClientConfig"
        ));
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_domain_validation_maps_to_invalid_request() {
        let error: ClientError = DomainError::EmptyPrompt.into();
        assert_eq!(
            error,
            ClientError::InvalidRequest("Prompt cannot be empty".to_string())
        );

        let error: ClientError = DomainError::MissingSelection(ModelRole::Ranker).into();
        assert!(matches!(error, ClientError::InvalidRequest(_)));
    }

    #[test]
    fn test_write_serialization_failure_is_not_config_parse() {
        let error: ClientError = DomainError::Serialization {
            what: "models_json",
            message: "key must be a string".to_string(),
        }
        .into();
        assert!(matches!(error, ClientError::InvalidRequest(ref m) if m.contains("models_json")));
    }

    #[test]
    fn test_stop_call_carries_both_messages() {
        let error = ClientError::StopCall {
            stream: "connection reset".to_string(),
            stop: "Transport closed".to_string(),
        };
        let text = error.to_string();
        assert!(text.contains("connection reset"));
        assert!(text.contains("Transport closed"));
    }
}
