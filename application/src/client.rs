//! Client façade.
//!
//! [`MiddlewareClient`] is the single entry point callers use. It owns the
//! gateway, builds every request through the [`RequestBuilder`], picks the
//! timeout policy per operation, and translates every failure into a
//! [`ClientError`].
//!
//! | Operation | Remote call | Bounded |
//! |-----------|-------------|---------|
//! | [`get_status`](MiddlewareClient::get_status) | `SayHello` | yes |
//! | [`check_backend`](MiddlewareClient::check_backend) | `SayHelloPyllm` | yes |
//! | [`get_config`](MiddlewareClient::get_config) | `GetClientConfig` | yes |
//! | [`get_history`](MiddlewareClient::get_history) | `GetChatHistory` | no |
//! | [`set_active_assistant`](MiddlewareClient::set_active_assistant) | `SetActiveAssistant` | no |
//! | [`chat`](MiddlewareClient::chat) | `Chat` | no |
//! | [`stop_chat`](MiddlewareClient::stop_chat) | `StopChat` | no |
//! | [`warmup`](MiddlewareClient::warmup) | `LoadModels` | no |
//! | [`remove_session`](MiddlewareClient::remove_session) | `RemoveSession` | no |
//! | [`set_parameters`](MiddlewareClient::set_parameters) | `SetParameters` | no |
//! | [`add_files`](MiddlewareClient::add_files) | `AddFiles` | no |
//! | [`remove_files`](MiddlewareClient::remove_files) | `RemoveFiles` | no |
//! | [`list_files`](MiddlewareClient::list_files) | `GetFileList` | no |
//! | [`download_files`](MiddlewareClient::download_files) | `DownloadFiles` | no |
//! | [`download_model`](MiddlewareClient::download_model) | `DownloadFiles` | no |
//! | [`set_models`](MiddlewareClient::set_models) | `SetModels` | no |
//!
//! `download_model` first reads the catalog with a bounded `GetClientConfig`.

use crate::chat_stream::ChatStream;
use crate::config::ClientOptions;
use crate::error::ClientError;
use crate::ports::middleware_gateway::{GatewayError, MiddlewareGateway, TransferFeed};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::request_builder::{ChatOptions, RequestBuilder};
use crate::transfer::TransferStream;
use sb_domain::{
    AssistantConfig, CallTimeout, ChatHistory, ClientConfig, FileList, GenerationParameters,
    ModelRole, SessionId, SetModelsRequest,
};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of [`MiddlewareClient::download_model`].
pub enum ModelDownload {
    /// The model folder already exists in the local hub; nothing was sent.
    AlreadyPresent(PathBuf),
    Started(TransferStream),
}

/// Typed client for the SuperBuilder middleware.
#[derive(Clone)]
pub struct MiddlewareClient {
    gateway: Arc<dyn MiddlewareGateway>,
    builder: RequestBuilder,
    options: ClientOptions,
    progress: Arc<dyn ProgressNotifier>,
}

impl MiddlewareClient {
    pub fn new(gateway: Arc<dyn MiddlewareGateway>, options: ClientOptions) -> Self {
        Self {
            gateway,
            builder: RequestBuilder::new(options.client_name.clone()),
            options,
            progress: Arc::new(NoProgress),
        }
    }

    /// Create with a progress notifier.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Greet the middleware; returns its greeting text.
    pub async fn get_status(&self) -> Result<String, ClientError> {
        let name = self.options.client_name.clone();
        self.call("SayHello", self.gateway.say_hello(&name, self.options.bounded()))
            .await
    }

    /// Whether the inference backend behind the middleware answers.
    pub async fn check_backend(&self) -> Result<bool, ClientError> {
        let name = self.options.client_name.clone();
        let message = self
            .call(
                "SayHelloPyllm",
                self.gateway.say_hello_backend(&name, self.options.bounded()),
            )
            .await?;
        Ok(!message.trim().is_empty())
    }

    pub async fn get_history(&self) -> Result<ChatHistory, ClientError> {
        let data = self
            .call(
                "GetChatHistory",
                self.gateway.get_chat_history(CallTimeout::Unbounded),
            )
            .await?;
        let history = ChatHistory::parse(data);
        if !history.is_well_formed() {
            warn!("Chat history is not a JSON array; keeping the raw payload only");
        } else if history.skipped() > 0 {
            warn!(
                "Skipped {} chat history entries without an integer sid",
                history.skipped()
            );
        }
        Ok(history)
    }

    pub async fn get_config(&self) -> Result<ClientConfig, ClientError> {
        let data = self
            .call(
                "GetClientConfig",
                self.gateway.get_client_config(self.options.bounded()),
            )
            .await?;
        Ok(ClientConfig::parse(&data)?)
    }

    /// Write `assistant` as the active assistant; returns the server message.
    pub async fn set_active_assistant(
        &self,
        assistant: &AssistantConfig,
    ) -> Result<String, ClientError> {
        let request = self.builder.set_active_assistant(assistant)?;
        info!(
            "Activating assistant '{}' ({} bytes of model selection)",
            request.assistant,
            request.models_json.len()
        );
        self.call(
            "SetActiveAssistant",
            self.gateway
                .set_active_assistant(&request, CallTimeout::Unbounded),
        )
        .await
    }

    /// Read the configuration, switch the chat model, write it back.
    ///
    /// Fails with [`ClientError::ModelNotFound`] before any write when the
    /// catalog has no chat model named `full_name`.
    pub async fn switch_chat_model(&self, full_name: &str) -> Result<AssistantConfig, ClientError> {
        let mut assistant = self.get_config().await?.into_active_assistant();
        assistant.select_chat_model(full_name)?;
        self.set_active_assistant(&assistant).await?;
        Ok(assistant)
    }

    /// Start a chat with default options.
    pub async fn chat(&self, prompt: &str) -> Result<ChatStream, ClientError> {
        self.chat_with(ChatOptions::new(prompt)).await
    }

    /// Start a chat.
    pub async fn chat_with(&self, options: ChatOptions) -> Result<ChatStream, ClientError> {
        let request = self.builder.chat(options)?;
        debug!(
            "Chat {} ({} chars, {} attachments)",
            request.session_id(),
            request.prompt().len(),
            request.attached_files().len()
        );

        self.progress.on_call_start("Chat");
        let frames = self
            .gateway
            .chat(&request, CallTimeout::Unbounded)
            .await
            .map_err(|e| self.fail("Chat", e));
        let frames = frames?;
        self.progress.on_call_complete("Chat", true);
        Ok(ChatStream::new(
            self.gateway.clone(),
            frames,
            self.progress.clone(),
            request.session_id(),
        ))
    }

    /// Abort whatever generation the middleware is running.
    pub async fn stop_chat(&self) -> Result<String, ClientError> {
        self.call("StopChat", self.gateway.stop_chat(CallTimeout::Unbounded))
            .await
    }

    /// Ask the middleware to load the active models.
    pub async fn warmup(&self) -> Result<String, ClientError> {
        self.call("LoadModels", self.gateway.load_models(CallTimeout::Unbounded))
            .await
    }

    pub async fn remove_session(&self, session_id: SessionId) -> Result<String, ClientError> {
        let session_id = self.builder.remove_session(session_id)?;
        self.call(
            "RemoveSession",
            self.gateway
                .remove_session(session_id, CallTimeout::Unbounded),
        )
        .await
    }

    pub async fn set_parameters(
        &self,
        parameters: &GenerationParameters,
    ) -> Result<String, ClientError> {
        let parameters = self.builder.set_parameters(parameters)?;
        self.call(
            "SetParameters",
            self.gateway
                .set_parameters(parameters, CallTimeout::Unbounded),
        )
        .await
    }

    /// Upload files into the knowledge base.
    ///
    /// Paths are made absolute and anything that is not an existing file is
    /// skipped; the returned stream reports upload progress.
    pub async fn add_files(&self, paths: &[PathBuf]) -> Result<TransferStream, ClientError> {
        let batch = self.builder.file_batch(paths)?;
        info!("Uploading {} files to the knowledge base", batch.len());
        self.open_transfer(
            "AddFiles",
            self.gateway.add_files(&batch, CallTimeout::Unbounded),
        )
        .await
    }

    /// Remove files from the knowledge base; returns the middleware's report.
    pub async fn remove_files(&self, paths: &[PathBuf]) -> Result<String, ClientError> {
        let batch = self.builder.file_batch(paths)?;
        let removed = self
            .call(
                "RemoveFiles",
                self.gateway.remove_files(&batch, CallTimeout::Unbounded),
            )
            .await?;
        // Failures come back in-band
        if removed.contains("Error") {
            warn!("RemoveFiles reported: {}", removed);
            return Err(ClientError::Call {
                operation: "RemoveFiles".to_string(),
                message: removed,
            });
        }
        Ok(removed)
    }

    /// Files currently in the knowledge base.
    pub async fn list_files(&self) -> Result<FileList, ClientError> {
        let data = self
            .call(
                "GetFileList",
                self.gateway.get_file_list("", CallTimeout::Unbounded),
            )
            .await?;
        let list = FileList::parse(data);
        if !list.is_well_formed() {
            warn!("File list is not a JSON array of paths: {}", list.raw());
        }
        Ok(list)
    }

    /// Download `url` into `local_path` on the middleware's machine.
    pub async fn download_files(
        &self,
        url: &str,
        local_path: &str,
    ) -> Result<TransferStream, ClientError> {
        let request = self.builder.download(url, local_path)?;
        self.open_transfer(
            "DownloadFiles",
            self.gateway.download_files(&request, CallTimeout::Unbounded),
        )
        .await
    }

    /// Download a catalog model into the local model hub unless its folder
    /// is already there.
    pub async fn download_model(
        &self,
        role: ModelRole,
        full_name: &str,
    ) -> Result<ModelDownload, ClientError> {
        let config = self.get_config().await?;
        let request = self.builder.download_model(&config, role, full_name)?;

        let folder = Path::new(&request.local_path).join(full_name);
        if folder.exists() {
            info!("Model '{}' already present at {}", full_name, folder.display());
            return Ok(ModelDownload::AlreadyPresent(folder));
        }

        info!("Downloading '{}' from {}", full_name, request.file_url);
        let stream = self
            .open_transfer(
                "DownloadFiles",
                self.gateway.download_files(&request, CallTimeout::Unbounded),
            )
            .await?;
        Ok(ModelDownload::Started(stream))
    }

    /// Point the middleware at local model folders or another assistant.
    pub async fn set_models(&self, request: SetModelsRequest) -> Result<String, ClientError> {
        let request = self.builder.set_models(request)?;
        self.call(
            "SetModels",
            self.gateway.set_models(&request, CallTimeout::Unbounded),
        )
        .await
    }

    /// Close the underlying session. Safe to call more than once.
    pub async fn close(&self) -> Result<(), ClientError> {
        self.gateway
            .close()
            .await
            .map_err(|e| ClientError::from_gateway("ClientDisconnected", e))
    }

    async fn call<F>(&self, operation: &str, call: F) -> Result<String, ClientError>
    where
        F: Future<Output = Result<String, GatewayError>>,
    {
        self.progress.on_call_start(operation);
        match call.await {
            Ok(message) => {
                self.progress.on_call_complete(operation, true);
                debug!("{} returned {} bytes", operation, message.len());
                Ok(message)
            }
            Err(e) => Err(self.fail(operation, e)),
        }
    }

    async fn open_transfer<F>(
        &self,
        operation: &str,
        call: F,
    ) -> Result<TransferStream, ClientError>
    where
        F: Future<Output = Result<Box<dyn TransferFeed>, GatewayError>>,
    {
        self.progress.on_call_start(operation);
        let feed = call.await.map_err(|e| self.fail(operation, e))?;
        self.progress.on_call_complete(operation, true);
        Ok(TransferStream::new(operation, feed, self.progress.clone()))
    }

    fn fail(&self, operation: &str, error: GatewayError) -> ClientError {
        self.progress.on_call_complete(operation, false);
        warn!("{} failed: {}", operation, error);
        ClientError::from_gateway(operation, error)
    }
}
