//! Configuration write request

use super::config::AssistantConfig;
use crate::core::error::DomainError;

/// A validated `SetActiveAssistant` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetActiveAssistantRequest {
    pub assistant: String,
    pub models_json: String,
}

impl SetActiveAssistantRequest {
    /// Build the write request for `config`.
    ///
    /// Fails when the short name is empty or any role has no selection, so
    /// nothing is sent for a half-configured assistant.
    pub fn from_assistant(config: &AssistantConfig) -> Result<Self, DomainError> {
        if config.short_name().trim().is_empty() {
            return Err(DomainError::MissingAssistantName);
        }
        Ok(Self {
            assistant: config.short_name().to_string(),
            models_json: config.models_json()?,
        })
    }
}
