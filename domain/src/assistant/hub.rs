//! Model hub requests: downloading models and pointing the middleware at them

use super::descriptor::ModelDescriptor;
use crate::core::error::DomainError;

/// A validated `DownloadFiles` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub file_url: String,
    pub local_path: String,
}

impl DownloadRequest {
    pub fn new(
        file_url: impl Into<String>,
        local_path: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let file_url = file_url.into();
        let local_path = local_path.into();
        if file_url.trim().is_empty() {
            return Err(DomainError::MissingField("download URL"));
        }
        if local_path.trim().is_empty() {
            return Err(DomainError::MissingField("local path"));
        }
        Ok(Self {
            file_url,
            local_path,
        })
    }

    /// Download `model` from its advertised link into `model_hub`.
    pub fn for_model(model: &ModelDescriptor, model_hub: &str) -> Result<Self, DomainError> {
        let link = model
            .download_link()
            .ok_or(DomainError::MissingField("download_link"))?;
        Self::new(link, model_hub)
    }
}

/// A `SetModels` request. Empty fields are left unchanged by the middleware.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetModelsRequest {
    pub llm: String,
    pub embedder: String,
    pub ranker: String,
    pub assistant: String,
}

impl SetModelsRequest {
    /// Switch the given assistant without touching model paths.
    pub fn for_assistant(assistant: impl Into<String>) -> Self {
        Self {
            assistant: assistant.into(),
            ..Self::default()
        }
    }

    pub fn with_llm(mut self, path: impl Into<String>) -> Self {
        self.llm = path.into();
        self
    }

    pub fn with_embedder(mut self, path: impl Into<String>) -> Self {
        self.embedder = path.into();
        self
    }

    pub fn with_ranker(mut self, path: impl Into<String>) -> Self {
        self.ranker = path.into();
        self
    }

    /// At least one field must be set.
    pub fn validate(&self) -> Result<(), DomainError> {
        let all_empty = [&self.llm, &self.embedder, &self.ranker, &self.assistant]
            .iter()
            .all(|field| field.trim().is_empty());
        if all_empty {
            return Err(DomainError::MissingField("model or assistant to set"));
        }
        Ok(())
    }
}
