//! Middleware Gateway port
//!
//! Defines the interface for calling the SuperBuilder middleware. One method
//! per remote operation; every method takes the [`CallTimeout`] it must honor.

use async_trait::async_trait;
use sb_domain::{
    CallTimeout, ChatRequest, DownloadRequest, FileBatch, GenerationParameters, SessionId,
    SetActiveAssistantRequest, SetModelsRequest, TransferUpdate,
};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during middleware gateway operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Transport closed")]
    TransportClosed,

    #[error("{operation} timed out after {}ms", after.as_millis())]
    Timeout { operation: String, after: Duration },

    #[error("{operation} rejected by middleware (code {code}): {message}")]
    Rejected {
        operation: String,
        code: i64,
        message: String,
    },

    #[error("Request failed: {0}")]
    RequestFailed(String),
}

impl GatewayError {
    /// Whether the transport itself is gone or unreachable.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            GatewayError::ConnectionError(_) | GatewayError::TransportClosed
        )
    }
}

/// One frame of a server-streamed chat reply.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    /// The raw fragment document (`{"message": "..."}`) as sent by the middleware.
    Item(String),
    /// Clean end of data.
    End,
    /// The middleware or the transport reported a failure mid-stream.
    Error(GatewayError),
}

/// Receiving side of a server-streamed chat reply.
///
/// `None` means the source went away without an [`StreamFrame::End`], which
/// consumers treat as a read error.
#[async_trait]
pub trait FragmentStream: Send {
    async fn next_frame(&mut self) -> Option<StreamFrame>;
}

/// One frame of a server-streamed upload or download.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferFrame {
    Update(TransferUpdate),
    End,
    Error(GatewayError),
}

/// Receiving side of `AddFiles` / `DownloadFiles` progress.
#[async_trait]
pub trait TransferFeed: Send {
    async fn next_update(&mut self) -> Option<TransferFrame>;
}

/// Gateway to the SuperBuilder middleware
///
/// This port defines how the application layer talks to the middleware.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait MiddlewareGateway: Send + Sync {
    /// `SayHello`: returns the greeting message.
    async fn say_hello(&self, name: &str, timeout: CallTimeout) -> Result<String, GatewayError>;

    /// `SayHelloPyllm`: returns the inference backend's greeting.
    async fn say_hello_backend(
        &self,
        name: &str,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError>;

    /// `GetChatHistory`: returns the raw `data` payload.
    async fn get_chat_history(&self, timeout: CallTimeout) -> Result<String, GatewayError>;

    /// `GetClientConfig`: returns the raw `data` payload.
    async fn get_client_config(&self, timeout: CallTimeout) -> Result<String, GatewayError>;

    /// `SetActiveAssistant`: returns the server message.
    async fn set_active_assistant(
        &self,
        request: &SetActiveAssistantRequest,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError>;

    /// `Chat`: opens a server stream of fragments.
    ///
    /// The timeout bounds issuing the call only, never the stream itself.
    async fn chat(
        &self,
        request: &ChatRequest,
        timeout: CallTimeout,
    ) -> Result<Box<dyn FragmentStream>, GatewayError>;

    /// `StopChat`: asks the middleware to abort the in-flight generation.
    async fn stop_chat(&self, timeout: CallTimeout) -> Result<String, GatewayError>;

    /// `LoadModels`: warms up the active models.
    async fn load_models(&self, timeout: CallTimeout) -> Result<String, GatewayError>;

    /// `RemoveSession`: drops a chat session from the middleware's history.
    async fn remove_session(
        &self,
        session_id: SessionId,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError>;

    /// `SetParameters`: updates sampling and retrieval settings.
    async fn set_parameters(
        &self,
        parameters: &GenerationParameters,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError>;

    /// `AddFiles`: uploads files into the knowledge base, streaming progress.
    async fn add_files(
        &self,
        files: &FileBatch,
        timeout: CallTimeout,
    ) -> Result<Box<dyn TransferFeed>, GatewayError>;

    /// `RemoveFiles`: returns the middleware's `filesRemoved` text.
    async fn remove_files(
        &self,
        files: &FileBatch,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError>;

    /// `GetFileList`: returns the raw `fileList` payload.
    async fn get_file_list(
        &self,
        file_type: &str,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError>;

    /// `DownloadFiles`: downloads a model into the local hub, streaming progress.
    async fn download_files(
        &self,
        request: &DownloadRequest,
        timeout: CallTimeout,
    ) -> Result<Box<dyn TransferFeed>, GatewayError>;

    /// `SetModels`: points the middleware at local model folders.
    async fn set_models(
        &self,
        request: &SetModelsRequest,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError>;

    /// Release the transport. Idempotent.
    async fn close(&self) -> Result<(), GatewayError>;
}
