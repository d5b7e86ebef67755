//! Typed request building.
//!
//! Turns caller input into validated request values. Anything that fails
//! here is reported as [`ClientError::InvalidRequest`] (or
//! [`ClientError::ModelNotFound`]) before a single byte is sent.

use crate::error::ClientError;
use sb_domain::{
    AssistantConfig, ChatHistory, ChatRequest, ClientConfig, DownloadRequest, FileBatch,
    GenerationParameters, ModelRole, SessionId, SetActiveAssistantRequest, SetModelsRequest,
};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Options for one chat call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    pub prompt: String,
    pub attachments: Vec<String>,
    pub query_type: Option<String>,
    /// Reuse this session id instead of generating one.
    pub session_id: Option<SessionId>,
    /// Override the configured client display name.
    pub name: Option<String>,
    /// Session ids already in use; a generated id avoids them.
    pub existing_sessions: Vec<i64>,
}

impl ChatOptions {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_attachments(mut self, files: Vec<String>) -> Self {
        self.attachments = files;
        self
    }

    pub fn with_query_type(mut self, query_type: impl Into<String>) -> Self {
        self.query_type = Some(query_type.into());
        self
    }

    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Avoid every session id present in `history`.
    pub fn avoiding(mut self, history: &ChatHistory) -> Self {
        self.existing_sessions = history.session_ids().collect();
        self
    }
}

/// Builds validated requests for the middleware.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    client_name: String,
}

impl RequestBuilder {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
        }
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    /// Build a chat request with a fresh session id unless one is supplied.
    pub fn chat(&self, options: ChatOptions) -> Result<ChatRequest, ClientError> {
        let session_id = match options.session_id {
            Some(id) if id.value() <= 0 => {
                return Err(ClientError::InvalidRequest(format!(
                    "session id must be positive, got {}",
                    id
                )));
            }
            Some(id) => id,
            None if options.existing_sessions.is_empty() => SessionId::generate(),
            None => SessionId::generate_excluding(options.existing_sessions),
        };
        let name = options
            .name
            .unwrap_or_else(|| self.client_name.clone());

        let mut request = ChatRequest::new(name, options.prompt, session_id)?
            .with_attachments(options.attachments);
        if let Some(query_type) = options.query_type {
            request = request.with_query_type(query_type);
        }
        Ok(request)
    }

    /// Build the configuration write for `assistant`.
    pub fn set_active_assistant(
        &self,
        assistant: &AssistantConfig,
    ) -> Result<SetActiveAssistantRequest, ClientError> {
        Ok(SetActiveAssistantRequest::from_assistant(assistant)?)
    }

    /// Validate a session id for `RemoveSession`.
    pub fn remove_session(&self, session_id: SessionId) -> Result<SessionId, ClientError> {
        if session_id.value() <= 0 {
            return Err(ClientError::InvalidRequest(format!(
                "session id must be positive, got {}",
                session_id
            )));
        }
        Ok(session_id)
    }

    /// Validate generation parameters for `SetParameters`.
    pub fn set_parameters<'a>(
        &self,
        parameters: &'a GenerationParameters,
    ) -> Result<&'a GenerationParameters, ClientError> {
        parameters.validate()?;
        Ok(parameters)
    }

    /// Resolve `paths` to absolute paths of existing files.
    ///
    /// Anything that is not a file is skipped with a warning; an empty
    /// result is [`ClientError::InvalidRequest`].
    pub fn file_batch(&self, paths: &[PathBuf]) -> Result<FileBatch, ClientError> {
        let resolved: Vec<String> = paths
            .iter()
            .filter_map(|path| Self::existing_file(path))
            .collect();
        Ok(FileBatch::new(resolved)?)
    }

    fn existing_file(path: &Path) -> Option<String> {
        let absolute = match std::path::absolute(path) {
            Ok(absolute) => absolute,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                return None;
            }
        };
        if !absolute.is_file() {
            warn!("Skipping {}: not a file", absolute.display());
            return None;
        }
        Some(absolute.to_string_lossy().into_owned())
    }

    /// Build the download of catalog model `full_name` into the middleware's model hub.
    pub fn download_model(
        &self,
        config: &ClientConfig,
        role: ModelRole,
        full_name: &str,
    ) -> Result<DownloadRequest, ClientError> {
        let model = config
            .active_assistant()
            .find_in_catalog(role, full_name)
            .ok_or_else(|| ClientError::ModelNotFound {
                role,
                full_name: full_name.to_string(),
            })?;
        let hub = config.local_model_hub().ok_or_else(|| {
            ClientError::InvalidRequest("configuration has no local_model_hub".to_string())
        })?;
        Ok(DownloadRequest::for_model(model, hub)?)
    }

    pub fn download(&self, url: &str, local_path: &str) -> Result<DownloadRequest, ClientError> {
        Ok(DownloadRequest::new(url, local_path)?)
    }

    pub fn set_models(&self, request: SetModelsRequest) -> Result<SetModelsRequest, ClientError> {
        request.validate()?;
        Ok(request)
    }
}
