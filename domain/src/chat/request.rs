//! Chat request value object

use super::session_id::SessionId;
use crate::core::error::DomainError;

/// Display name sent with chat requests when the caller does not set one.
pub const DEFAULT_CLIENT_NAME: &str = "SuperBuilder Rust Client";

/// A validated chat request.
///
/// Construction fails on an empty prompt, so every value of this type can
/// be sent as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    name: String,
    prompt: String,
    session_id: SessionId,
    attached_files: Vec<String>,
    query_type: Option<String>,
}

impl ChatRequest {
    pub fn new(
        name: impl Into<String>,
        prompt: impl Into<String>,
        session_id: SessionId,
    ) -> Result<Self, DomainError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(DomainError::EmptyPrompt);
        }
        Ok(Self {
            name: name.into(),
            prompt,
            session_id,
            attached_files: Vec::new(),
            query_type: None,
        })
    }

    pub fn with_attachments(mut self, files: Vec<String>) -> Self {
        self.attached_files = files;
        self
    }

    pub fn with_query_type(mut self, query_type: impl Into<String>) -> Self {
        self.query_type = Some(query_type.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn attached_files(&self) -> &[String] {
        &self.attached_files
    }

    pub fn query_type(&self) -> Option<&str> {
        self.query_type.as_deref()
    }

    /// Attachments as the middleware expects them: a JSON array string,
    /// with the literal `"[]"` when there are none.
    pub fn attached_files_wire(&self) -> String {
        if self.attached_files.is_empty() {
            return "[]".to_string();
        }
        serde_json::to_string(&self.attached_files).unwrap_or_else(|_| "[]".to_string())
    }
}
