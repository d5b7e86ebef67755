//! Middleware Gateway implementation

use crate::middleware::error::MiddlewareError;
use crate::middleware::protocol::methods;
use crate::middleware::protocol::pb::{self, super_builder_client::SuperBuilderClient};
use crate::middleware::session::{self, SessionOptions};
use async_trait::async_trait;
use sb_application::ports::middleware_gateway::{
    FragmentStream, GatewayError, MiddlewareGateway, StreamFrame, TransferFeed, TransferFrame,
};
use sb_domain::{
    CallTimeout, ChatRequest, DownloadRequest, FileBatch, GenerationParameters, SessionId,
    SetActiveAssistantRequest, SetModelsRequest, TransferUpdate,
};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tonic::Streaming;
use tonic::transport::Channel;
use tracing::{debug, info, trace, warn};

/// How long `close` waits for the middleware to acknowledge `ClientDisconnected`.
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(2);

type Client = SuperBuilderClient<Channel>;

/// Gateway implementation calling the SuperBuilder gRPC service
///
/// Every call runs over one shared channel. After [`close`](MiddlewareGateway::close)
/// every call fails with [`GatewayError::TransportClosed`].
pub struct GrpcMiddlewareGateway {
    client: Mutex<Option<Client>>,
    address: String,
}

impl GrpcMiddlewareGateway {
    /// Open the channel described by `options`.
    pub async fn connect(options: &SessionOptions) -> Result<Self, GatewayError> {
        let channel = session::open(options)
            .await
            .map_err(|e| e.into_gateway("connect"))?;

        info!("GrpcMiddlewareGateway initialized ({})", options.address);
        Ok(Self::with_channel(channel, options.address.clone()))
    }

    /// Create a gateway over an existing channel
    pub fn with_channel(channel: Channel, address: impl Into<String>) -> Self {
        Self {
            client: Mutex::new(Some(SuperBuilderClient::new(channel))),
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Client>> {
        self.client.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Issue one call, honoring `timeout`, and unwrap its response.
    async fn call<T, F, Fut>(
        &self,
        operation: &str,
        timeout: CallTimeout,
        call: F,
    ) -> Result<T, GatewayError>
    where
        F: FnOnce(Client) -> Fut,
        Fut: Future<Output = Result<tonic::Response<T>, tonic::Status>>,
    {
        self.call_inner(operation, timeout, call)
            .await
            .map_err(|e| e.into_gateway(operation))
    }

    async fn call_inner<T, F, Fut>(
        &self,
        operation: &str,
        timeout: CallTimeout,
        call: F,
    ) -> Result<T, MiddlewareError>
    where
        F: FnOnce(Client) -> Fut,
        Fut: Future<Output = Result<tonic::Response<T>, tonic::Status>>,
    {
        let client = self.slot().clone().ok_or(MiddlewareError::SessionClosed)?;
        debug!("-> {} ({})", operation, timeout);

        let response = match timeout.as_duration() {
            Some(limit) => tokio::time::timeout(limit, call(client))
                .await
                .map_err(|_| MiddlewareError::Timeout(limit))??,
            None => call(client).await?,
        };
        Ok(response.into_inner())
    }
}

#[async_trait]
impl MiddlewareGateway for GrpcMiddlewareGateway {
    async fn say_hello(&self, name: &str, timeout: CallTimeout) -> Result<String, GatewayError> {
        let request = pb::SayHelloRequest {
            name: name.to_string(),
        };
        let response = self
            .call(methods::SAY_HELLO, timeout, move |mut client| async move {
                client.say_hello(request).await
            })
            .await?;
        Ok(response.message)
    }

    async fn say_hello_backend(
        &self,
        name: &str,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError> {
        let request = pb::SayHelloRequest {
            name: name.to_string(),
        };
        let response = self
            .call(methods::SAY_HELLO_PYLLM, timeout, move |mut client| async move {
                client.say_hello_pyllm(request).await
            })
            .await?;
        Ok(response.message)
    }

    async fn get_chat_history(&self, timeout: CallTimeout) -> Result<String, GatewayError> {
        let response = self
            .call(methods::GET_CHAT_HISTORY, timeout, |mut client| async move {
                client.get_chat_history(pb::GetChatHistoryRequest {}).await
            })
            .await?;
        Ok(response.data)
    }

    async fn get_client_config(&self, timeout: CallTimeout) -> Result<String, GatewayError> {
        let response = self
            .call(methods::GET_CLIENT_CONFIG, timeout, |mut client| async move {
                client.get_client_config(pb::GetClientConfigRequest {}).await
            })
            .await?;
        Ok(response.data)
    }

    async fn set_active_assistant(
        &self,
        request: &SetActiveAssistantRequest,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError> {
        let request = pb::SetActiveAssistantRequest::from(request);
        let response = self
            .call(methods::SET_ACTIVE_ASSISTANT, timeout, move |mut client| async move {
                client.set_active_assistant(request).await
            })
            .await?;
        Ok(response.message)
    }

    async fn chat(
        &self,
        request: &ChatRequest,
        timeout: CallTimeout,
    ) -> Result<Box<dyn FragmentStream>, GatewayError> {
        debug!("Opening chat stream for session {}", request.session_id());
        let request = pb::ChatRequest::from(request);
        // The timeout covers opening the stream, not reading it
        let inner = self
            .call(methods::CHAT, timeout, move |mut client| async move {
                client.chat(request).await
            })
            .await?;
        Ok(Box::new(ServerStream::new(methods::CHAT, inner)))
    }

    async fn stop_chat(&self, timeout: CallTimeout) -> Result<String, GatewayError> {
        let response = self
            .call(methods::STOP_CHAT, timeout, |mut client| async move {
                client.stop_chat(pb::StopChatRequest {}).await
            })
            .await?;
        Ok(response.message)
    }

    async fn load_models(&self, timeout: CallTimeout) -> Result<String, GatewayError> {
        let response = self
            .call(methods::LOAD_MODELS, timeout, |mut client| async move {
                client.load_models(pb::LoadModelsRequest {}).await
            })
            .await?;
        Ok(response.message)
    }

    async fn remove_session(
        &self,
        session_id: SessionId,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError> {
        let request = pb::RemoveSessionRequest::from(session_id);
        let response = self
            .call(methods::REMOVE_SESSION, timeout, move |mut client| async move {
                client.remove_session(request).await
            })
            .await?;
        Ok(response.message)
    }

    async fn set_parameters(
        &self,
        parameters: &GenerationParameters,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError> {
        let request = pb::SetParametersRequest::from(parameters);
        let response = self
            .call(methods::SET_PARAMETERS, timeout, move |mut client| async move {
                client.set_parameters(request).await
            })
            .await?;
        Ok(response.message)
    }

    async fn add_files(
        &self,
        files: &FileBatch,
        timeout: CallTimeout,
    ) -> Result<Box<dyn TransferFeed>, GatewayError> {
        let request = pb::AddFilesRequest {
            files_to_upload: batch_wire(files)?,
        };
        let inner = self
            .call(methods::ADD_FILES, timeout, move |mut client| async move {
                client.add_files(request).await
            })
            .await?;
        Ok(Box::new(ServerStream::new(methods::ADD_FILES, inner)))
    }

    async fn remove_files(
        &self,
        files: &FileBatch,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError> {
        let request = pb::RemoveFilesRequest {
            files_to_remove: batch_wire(files)?,
        };
        let response = self
            .call(methods::REMOVE_FILES, timeout, move |mut client| async move {
                client.remove_files(request).await
            })
            .await?;
        Ok(response.files_removed)
    }

    async fn get_file_list(
        &self,
        file_type: &str,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError> {
        let request = pb::GetFileListRequest {
            file_type: file_type.to_string(),
        };
        let response = self
            .call(methods::GET_FILE_LIST, timeout, move |mut client| async move {
                client.get_file_list(request).await
            })
            .await?;
        Ok(response.file_list)
    }

    async fn download_files(
        &self,
        request: &DownloadRequest,
        timeout: CallTimeout,
    ) -> Result<Box<dyn TransferFeed>, GatewayError> {
        let request = pb::DownloadFilesRequest::from(request);
        let inner = self
            .call(methods::DOWNLOAD_FILES, timeout, move |mut client| async move {
                client.download_files(request).await
            })
            .await?;
        Ok(Box::new(ServerStream::new(methods::DOWNLOAD_FILES, inner)))
    }

    async fn set_models(
        &self,
        request: &SetModelsRequest,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError> {
        let request = pb::SetModelsRequest::from(request);
        let response = self
            .call(methods::SET_MODELS, timeout, move |mut client| async move {
                client.set_models(request).await
            })
            .await?;
        Ok(response.message)
    }

    async fn close(&self) -> Result<(), GatewayError> {
        let Some(mut client) = self.slot().take() else {
            debug!("Gateway for {} already closed", self.address);
            return Ok(());
        };

        let notify = client.client_disconnected(pb::ClientDisconnectedRequest {});
        match tokio::time::timeout(DISCONNECT_TIMEOUT, notify).await {
            Ok(Ok(_)) => info!("Disconnected from middleware at {}", self.address),
            Ok(Err(status)) => warn!(
                "{} failed: {}",
                methods::CLIENT_DISCONNECTED,
                status.message()
            ),
            Err(_) => warn!(
                "{} not acknowledged within {}ms",
                methods::CLIENT_DISCONNECTED,
                DISCONNECT_TIMEOUT.as_millis()
            ),
        }
        Ok(())
    }
}

fn batch_wire(files: &FileBatch) -> Result<String, GatewayError> {
    files
        .to_wire()
        .map_err(|e| GatewayError::RequestFailed(e.to_string()))
}

/// One server-streamed RPC, read message by message.
struct ServerStream<T> {
    operation: &'static str,
    inner: Streaming<T>,
    finished: bool,
}

enum Next<T> {
    Message(T),
    End,
    Failed(GatewayError),
}

impl<T> ServerStream<T> {
    fn new(operation: &'static str, inner: Streaming<T>) -> Self {
        Self {
            operation,
            inner,
            finished: false,
        }
    }

    /// `None` once the stream has ended or failed.
    async fn next(&mut self) -> Option<Next<T>> {
        if self.finished {
            return None;
        }
        match self.inner.message().await {
            Ok(Some(message)) => Some(Next::Message(message)),
            Ok(None) => {
                trace!("{} stream ended", self.operation);
                self.finished = true;
                Some(Next::End)
            }
            Err(status) => {
                self.finished = true;
                Some(Next::Failed(
                    MiddlewareError::from(status).into_gateway(self.operation),
                ))
            }
        }
    }
}

#[async_trait]
impl FragmentStream for ServerStream<pb::ChatResponse> {
    async fn next_frame(&mut self) -> Option<StreamFrame> {
        Some(match self.next().await? {
            Next::Message(response) => StreamFrame::Item(response.message),
            Next::End => StreamFrame::End,
            Next::Failed(error) => StreamFrame::Error(error),
        })
    }
}

#[async_trait]
impl TransferFeed for ServerStream<pb::AddFilesResponse> {
    async fn next_update(&mut self) -> Option<TransferFrame> {
        Some(match self.next().await? {
            Next::Message(response) => TransferFrame::Update(TransferUpdate::new(
                response.files_uploaded,
                response.current_file_progress,
            )),
            Next::End => TransferFrame::End,
            Next::Failed(error) => TransferFrame::Error(error),
        })
    }
}

#[async_trait]
impl TransferFeed for ServerStream<pb::DownloadFilesResponse> {
    async fn next_update(&mut self) -> Option<TransferFrame> {
        Some(match self.next().await? {
            Next::Message(response) => TransferFrame::Update(TransferUpdate::new(
                response.file_downloaded,
                response.progress,
            )),
            Next::End => TransferFrame::End,
            Next::Failed(error) => TransferFrame::Error(error),
        })
    }
}
