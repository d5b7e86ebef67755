//! Domain error types

use crate::assistant::role::ModelRole;
use serde::Serialize;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Malformed configuration payload: {0}")]
    ConfigParse(String),

    #[error("No {role} named '{full_name}' in the model catalog")]
    ModelNotFound { role: ModelRole, full_name: String },

    #[error("No {0} selected for the active assistant")]
    MissingSelection(ModelRole),

    #[error("Assistant short name is empty")]
    MissingAssistantName,

    #[error("Prompt cannot be empty")]
    EmptyPrompt,

    #[error("Failed to serialize {what}: {message}")]
    Serialization { what: &'static str, message: String },

    #[error("No files given")]
    NoFiles,

    #[error("Invalid file path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("Missing {0}")]
    MissingField(&'static str),

    #[error("Malformed chat fragment: {0}")]
    InvalidFragment(String),

    #[error("Invalid generation parameter: {0}")]
    InvalidParameter(String),
}

impl DomainError {
    /// Check if this error means the requested model is absent from the catalog
    pub fn is_model_not_found(&self) -> bool {
        matches!(self, DomainError::ModelNotFound { .. })
    }
}

/// Serialize an outgoing payload, reporting failure as [`DomainError::Serialization`].
pub(crate) fn to_json<T: Serialize + ?Sized>(
    what: &'static str,
    value: &T,
) -> Result<String, DomainError> {
    serde_json::to_string(value).map_err(|e| DomainError::Serialization {
        what,
        message: e.to_string(),
    })
}
