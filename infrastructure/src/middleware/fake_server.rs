//! In-process fake middleware for gateway tests.
//!
//! Serves the generated `SuperBuilder` service on an ephemeral port,
//! records every request it receives, and answers from a [`Script`].

use super::protocol::pb::{
    self,
    super_builder_server::{SuperBuilder, SuperBuilderServer},
};
use super::session::SessionOptions;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_stream::Stream;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

type ResponseStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send>>;

/// How the fake middleware answers.
#[derive(Clone, Default)]
pub(crate) struct Script {
    /// Delay before answering `SayHello`.
    pub hello_delay: Option<Duration>,
    pub history: String,
    pub config: String,
    /// `Chat` stream items; an `Err` ends the stream with that status.
    pub chat: Vec<Result<String, Status>>,
    pub uploads: Vec<(String, i32)>,
    pub downloads: Vec<(String, i32)>,
    pub file_list: String,
    /// Fail the named RPC with this status.
    pub reject: Option<(&'static str, Status)>,
}

/// A request as the fake middleware received it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Received {
    SayHello(pb::SayHelloRequest),
    SayHelloPyllm(pb::SayHelloRequest),
    ClientDisconnected,
    GetClientConfig,
    SetActiveAssistant(pb::SetActiveAssistantRequest),
    SetParameters(pb::SetParametersRequest),
    LoadModels,
    Chat(pb::ChatRequest),
    StopChat,
    GetChatHistory,
    RemoveSession(pb::RemoveSessionRequest),
    AddFiles(pb::AddFilesRequest),
    RemoveFiles(pb::RemoveFilesRequest),
    GetFileList(pb::GetFileListRequest),
    DownloadFiles(pb::DownloadFilesRequest),
    SetModels(pb::SetModelsRequest),
}

impl Received {
    pub fn name(&self) -> &'static str {
        match self {
            Received::SayHello(_) => "SayHello",
            Received::SayHelloPyllm(_) => "SayHelloPyllm",
            Received::ClientDisconnected => "ClientDisconnected",
            Received::GetClientConfig => "GetClientConfig",
            Received::SetActiveAssistant(_) => "SetActiveAssistant",
            Received::SetParameters(_) => "SetParameters",
            Received::LoadModels => "LoadModels",
            Received::Chat(_) => "Chat",
            Received::StopChat => "StopChat",
            Received::GetChatHistory => "GetChatHistory",
            Received::RemoveSession(_) => "RemoveSession",
            Received::AddFiles(_) => "AddFiles",
            Received::RemoveFiles(_) => "RemoveFiles",
            Received::GetFileList(_) => "GetFileList",
            Received::DownloadFiles(_) => "DownloadFiles",
            Received::SetModels(_) => "SetModels",
        }
    }
}

struct FakeService {
    script: Script,
    received: Arc<Mutex<Vec<Received>>>,
}

impl FakeService {
    fn record(&self, received: Received) -> Result<(), Status> {
        let name = received.name();
        self.received.lock().unwrap().push(received);
        match &self.script.reject {
            Some((rejected, status)) if *rejected == name => Err(status.clone()),
            _ => Ok(()),
        }
    }

    fn message<T>(&self, received: Received, reply: T) -> Result<Response<T>, Status> {
        self.record(received)?;
        Ok(Response::new(reply))
    }
}

fn stream_of<T: Send + 'static>(items: Vec<Result<T, Status>>) -> ResponseStream<T> {
    Box::pin(tokio_stream::iter(items))
}

#[tonic::async_trait]
impl SuperBuilder for FakeService {
    type ChatStream = ResponseStream<pb::ChatResponse>;
    type AddFilesStream = ResponseStream<pb::AddFilesResponse>;
    type DownloadFilesStream = ResponseStream<pb::DownloadFilesResponse>;

    async fn say_hello(
        &self,
        request: Request<pb::SayHelloRequest>,
    ) -> Result<Response<pb::SayHelloResponse>, Status> {
        if let Some(delay) = self.script.hello_delay {
            tokio::time::sleep(delay).await;
        }
        let request = request.into_inner();
        let message = format!("Hello {}", request.name);
        self.message(Received::SayHello(request), pb::SayHelloResponse { message })
    }

    async fn say_hello_pyllm(
        &self,
        request: Request<pb::SayHelloRequest>,
    ) -> Result<Response<pb::SayHelloResponse>, Status> {
        let request = request.into_inner();
        let message = format!("Hello {} from the backend", request.name);
        self.message(Received::SayHelloPyllm(request), pb::SayHelloResponse { message })
    }

    async fn client_disconnected(
        &self,
        _request: Request<pb::ClientDisconnectedRequest>,
    ) -> Result<Response<pb::ClientDisconnectedResponse>, Status> {
        let message = "bye".to_string();
        self.message(
            Received::ClientDisconnected,
            pb::ClientDisconnectedResponse { message },
        )
    }

    async fn get_client_config(
        &self,
        _request: Request<pb::GetClientConfigRequest>,
    ) -> Result<Response<pb::GetClientConfigResponse>, Status> {
        let data = self.script.config.clone();
        self.message(Received::GetClientConfig, pb::GetClientConfigResponse { data })
    }

    async fn set_active_assistant(
        &self,
        request: Request<pb::SetActiveAssistantRequest>,
    ) -> Result<Response<pb::SetActiveAssistantResponse>, Status> {
        let message = "assistant updated".to_string();
        self.message(
            Received::SetActiveAssistant(request.into_inner()),
            pb::SetActiveAssistantResponse { message },
        )
    }

    async fn set_parameters(
        &self,
        request: Request<pb::SetParametersRequest>,
    ) -> Result<Response<pb::SetParametersResponse>, Status> {
        let message = "parameters set".to_string();
        self.message(
            Received::SetParameters(request.into_inner()),
            pb::SetParametersResponse { message },
        )
    }

    async fn load_models(
        &self,
        _request: Request<pb::LoadModelsRequest>,
    ) -> Result<Response<pb::LoadModelsResponse>, Status> {
        let message = "models loaded".to_string();
        self.message(Received::LoadModels, pb::LoadModelsResponse { message })
    }

    async fn chat(
        &self,
        request: Request<pb::ChatRequest>,
    ) -> Result<Response<Self::ChatStream>, Status> {
        self.record(Received::Chat(request.into_inner()))?;
        let items = self
            .script
            .chat
            .iter()
            .cloned()
            .map(|item| item.map(|message| pb::ChatResponse { message }))
            .collect();
        Ok(Response::new(stream_of(items)))
    }

    async fn stop_chat(
        &self,
        _request: Request<pb::StopChatRequest>,
    ) -> Result<Response<pb::StopChatResponse>, Status> {
        let message = "stopped".to_string();
        self.message(Received::StopChat, pb::StopChatResponse { message })
    }

    async fn get_chat_history(
        &self,
        _request: Request<pb::GetChatHistoryRequest>,
    ) -> Result<Response<pb::GetChatHistoryResponse>, Status> {
        let data = self.script.history.clone();
        self.message(Received::GetChatHistory, pb::GetChatHistoryResponse { data })
    }

    async fn remove_session(
        &self,
        request: Request<pb::RemoveSessionRequest>,
    ) -> Result<Response<pb::RemoveSessionResponse>, Status> {
        let request = request.into_inner();
        let message = format!("removed {}", request.session_id);
        self.message(
            Received::RemoveSession(request),
            pb::RemoveSessionResponse { message },
        )
    }

    async fn add_files(
        &self,
        request: Request<pb::AddFilesRequest>,
    ) -> Result<Response<Self::AddFilesStream>, Status> {
        self.record(Received::AddFiles(request.into_inner()))?;
        let items = self
            .script
            .uploads
            .iter()
            .map(|(detail, progress)| {
                Ok(pb::AddFilesResponse {
                    files_uploaded: detail.clone(),
                    current_file_progress: *progress,
                })
            })
            .collect();
        Ok(Response::new(stream_of(items)))
    }

    async fn remove_files(
        &self,
        request: Request<pb::RemoveFilesRequest>,
    ) -> Result<Response<pb::RemoveFilesResponse>, Status> {
        let files_removed = "Removed".to_string();
        self.message(
            Received::RemoveFiles(request.into_inner()),
            pb::RemoveFilesResponse { files_removed },
        )
    }

    async fn get_file_list(
        &self,
        request: Request<pb::GetFileListRequest>,
    ) -> Result<Response<pb::GetFileListResponse>, Status> {
        let file_list = self.script.file_list.clone();
        self.message(
            Received::GetFileList(request.into_inner()),
            pb::GetFileListResponse { file_list },
        )
    }

    async fn download_files(
        &self,
        request: Request<pb::DownloadFilesRequest>,
    ) -> Result<Response<Self::DownloadFilesStream>, Status> {
        self.record(Received::DownloadFiles(request.into_inner()))?;
        let items = self
            .script
            .downloads
            .iter()
            .map(|(detail, progress)| {
                Ok(pb::DownloadFilesResponse {
                    file_downloaded: detail.clone(),
                    progress: *progress,
                })
            })
            .collect();
        Ok(Response::new(stream_of(items)))
    }

    async fn set_models(
        &self,
        request: Request<pb::SetModelsRequest>,
    ) -> Result<Response<pb::SetModelsResponse>, Status> {
        let message = "models set".to_string();
        self.message(
            Received::SetModels(request.into_inner()),
            pb::SetModelsResponse { message },
        )
    }
}

pub(crate) struct FakeMiddleware {
    address: String,
    received: Arc<Mutex<Vec<Received>>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl FakeMiddleware {
    /// Serve `script` until dropped.
    pub async fn spawn(script: Script) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let received = Arc::new(Mutex::new(Vec::new()));
        let service = FakeService {
            script,
            received: Arc::clone(&received),
        };
        let (shutdown, stopped) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = Server::builder()
                .add_service(SuperBuilderServer::new(service))
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
                    let _ = stopped.await;
                })
                .await;
        });

        Self {
            address,
            received,
            shutdown: Some(shutdown),
        }
    }

    pub fn options(&self) -> SessionOptions {
        SessionOptions::new(self.address.clone()).with_connect_timeout(Duration::from_secs(5))
    }

    /// Every request received so far, in arrival order.
    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.received().iter().filter(|r| r.name() == name).count()
    }
}

impl Drop for FakeMiddleware {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
