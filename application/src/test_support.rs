//! Scripted gateway shared by the application-layer tests.

use crate::ports::middleware_gateway::{
    FragmentStream, GatewayError, MiddlewareGateway, StreamFrame, TransferFeed, TransferFrame,
};
use async_trait::async_trait;
use sb_domain::{
    CallTimeout, ChatRequest, DownloadRequest, FileBatch, GenerationParameters, SessionId,
    SetActiveAssistantRequest, SetModelsRequest, TransferUpdate,
};
use std::collections::VecDeque;
use std::sync::Mutex;

pub(crate) const CONFIG_PAYLOAD: &str = r#"{
    "ActiveAssistant": {
        "short_name": "default",
        "models": [
            {"model_type": "embedding_model", "full_name": "bge-base-en-v1.5-int8-ov"},
            {"model_type": "ranker_model", "full_name": "bge-reranker-base-int8-ov"},
            {"model_type": "chat_model", "full_name": "Phi-3-mini-4k-instruct-int4-ov"}
        ],
        "all_models": [
            {"model_type": "embedding_model", "full_name": "bge-base-en-v1.5-int8-ov"},
            {"model_type": "ranker_model", "full_name": "bge-reranker-base-int8-ov"},
            {"model_type": "chat_model", "full_name": "Phi-3-mini-4k-instruct-int4-ov"},
            {
                "model_type": "chat_model",
                "full_name": "Mistral-7B-Instruct-v0.2-int4-ov",
                "download_link": "https://example.invalid/mistral-7b-int4-ov"
            }
        ]
    },
    "local_model_hub": "C:\\models"
}"#;

pub(crate) fn fragment(text: &str) -> StreamFrame {
    StreamFrame::Item(serde_json::json!({ "message": text }).to_string())
}

/// Frames handed out one by one; `None` once exhausted.
pub(crate) struct ScriptedStream {
    frames: VecDeque<StreamFrame>,
}

#[async_trait]
impl FragmentStream for ScriptedStream {
    async fn next_frame(&mut self) -> Option<StreamFrame> {
        self.frames.pop_front()
    }
}

/// Transfer frames handed out one by one; `None` once exhausted.
pub(crate) struct ScriptedFeed {
    frames: VecDeque<TransferFrame>,
}

impl ScriptedFeed {
    pub fn new(frames: Vec<TransferFrame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }
}

#[async_trait]
impl TransferFeed for ScriptedFeed {
    async fn next_update(&mut self) -> Option<TransferFrame> {
        self.frames.pop_front()
    }
}

pub(crate) fn progress(detail: &str, percent: i32) -> TransferFrame {
    TransferFrame::Update(TransferUpdate::new(detail, percent))
}

/// Records every call and answers from a script.
pub(crate) struct ScriptedGateway {
    pub calls: Mutex<Vec<(String, CallTimeout)>>,
    pub config_payload: Mutex<String>,
    pub history_payload: String,
    pub streams: Mutex<VecDeque<Vec<StreamFrame>>>,
    pub stop_result: Mutex<Result<String, GatewayError>>,
    pub unary_error: Mutex<Option<GatewayError>>,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    pub set_requests: Mutex<Vec<SetActiveAssistantRequest>>,
    pub transfers: Mutex<VecDeque<Vec<TransferFrame>>>,
    pub file_batches: Mutex<Vec<(String, FileBatch)>>,
    pub file_list_payload: String,
    pub downloads: Mutex<Vec<DownloadRequest>>,
    pub set_models_requests: Mutex<Vec<SetModelsRequest>>,
    pub closed: Mutex<usize>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            config_payload: Mutex::new(CONFIG_PAYLOAD.to_string()),
            history_payload: r#"[{"sid": 11}, {"sid": 12}]"#.to_string(),
            streams: Mutex::new(VecDeque::new()),
            stop_result: Mutex::new(Ok("stopped".to_string())),
            unary_error: Mutex::new(None),
            chat_requests: Mutex::new(Vec::new()),
            set_requests: Mutex::new(Vec::new()),
            transfers: Mutex::new(VecDeque::new()),
            file_batches: Mutex::new(Vec::new()),
            file_list_payload: r#"["C:\\docs\\a.pdf"]"#.to_string(),
            downloads: Mutex::new(Vec::new()),
            set_models_requests: Mutex::new(Vec::new()),
            closed: Mutex::new(0),
        }
    }

    pub fn with_history(mut self, payload: &str) -> Self {
        self.history_payload = payload.to_string();
        self
    }

    pub fn with_transfer(self, frames: Vec<TransferFrame>) -> Self {
        self.transfers.lock().unwrap().push_back(frames);
        self
    }

    fn next_transfer(&self) -> Box<dyn TransferFeed> {
        let frames = self.transfers.lock().unwrap().pop_front().unwrap_or_default();
        Box::new(ScriptedFeed::new(frames))
    }

    pub fn with_stream(self, frames: Vec<StreamFrame>) -> Self {
        self.streams.lock().unwrap().push_back(frames);
        self
    }

    pub fn with_stop_result(self, result: Result<String, GatewayError>) -> Self {
        *self.stop_result.lock().unwrap() = result;
        self
    }

    pub fn with_unary_error(self, error: GatewayError) -> Self {
        *self.unary_error.lock().unwrap() = Some(error);
        self
    }

    pub fn operations(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(op, _)| op.clone())
            .collect()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.operations().iter().filter(|op| *op == operation).count()
    }

    pub fn timeout_of(&self, operation: &str) -> Option<CallTimeout> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(op, _)| op == operation)
            .map(|(_, t)| *t)
    }

    fn record(&self, operation: &str, timeout: CallTimeout) -> Result<(), GatewayError> {
        self.calls
            .lock()
            .unwrap()
            .push((operation.to_string(), timeout));
        match self.unary_error.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MiddlewareGateway for ScriptedGateway {
    async fn say_hello(&self, name: &str, timeout: CallTimeout) -> Result<String, GatewayError> {
        self.record("SayHello", timeout)?;
        Ok(format!("Hello {}", name))
    }

    async fn say_hello_backend(
        &self,
        name: &str,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError> {
        self.record("SayHelloPyllm", timeout)?;
        Ok(format!("Hello {} from the backend", name))
    }

    async fn get_chat_history(&self, timeout: CallTimeout) -> Result<String, GatewayError> {
        self.record("GetChatHistory", timeout)?;
        Ok(self.history_payload.clone())
    }

    async fn get_client_config(&self, timeout: CallTimeout) -> Result<String, GatewayError> {
        self.record("GetClientConfig", timeout)?;
        Ok(self.config_payload.lock().unwrap().clone())
    }

    async fn set_active_assistant(
        &self,
        request: &SetActiveAssistantRequest,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError> {
        self.record("SetActiveAssistant", timeout)?;
        self.set_requests.lock().unwrap().push(request.clone());
        Ok("assistant updated".to_string())
    }

    async fn chat(
        &self,
        request: &ChatRequest,
        timeout: CallTimeout,
    ) -> Result<Box<dyn FragmentStream>, GatewayError> {
        self.record("Chat", timeout)?;
        self.chat_requests.lock().unwrap().push(request.clone());
        let frames = self.streams.lock().unwrap().pop_front().unwrap_or_default();
        Ok(Box::new(ScriptedStream {
            frames: frames.into(),
        }))
    }

    async fn stop_chat(&self, timeout: CallTimeout) -> Result<String, GatewayError> {
        self.calls
            .lock()
            .unwrap()
            .push(("StopChat".to_string(), timeout));
        self.stop_result.lock().unwrap().clone()
    }

    async fn load_models(&self, timeout: CallTimeout) -> Result<String, GatewayError> {
        self.record("LoadModels", timeout)?;
        Ok("models loaded".to_string())
    }

    async fn remove_session(
        &self,
        session_id: SessionId,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError> {
        self.record("RemoveSession", timeout)?;
        Ok(format!("removed {}", session_id))
    }

    async fn set_parameters(
        &self,
        _parameters: &GenerationParameters,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError> {
        self.record("SetParameters", timeout)?;
        Ok("parameters set".to_string())
    }

    async fn add_files(
        &self,
        files: &FileBatch,
        timeout: CallTimeout,
    ) -> Result<Box<dyn TransferFeed>, GatewayError> {
        self.record("AddFiles", timeout)?;
        self.file_batches
            .lock()
            .unwrap()
            .push(("AddFiles".to_string(), files.clone()));
        Ok(self.next_transfer())
    }

    async fn remove_files(
        &self,
        files: &FileBatch,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError> {
        self.record("RemoveFiles", timeout)?;
        self.file_batches
            .lock()
            .unwrap()
            .push(("RemoveFiles".to_string(), files.clone()));
        Ok(format!("Removed {} files", files.len()))
    }

    async fn get_file_list(
        &self,
        _file_type: &str,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError> {
        self.record("GetFileList", timeout)?;
        Ok(self.file_list_payload.clone())
    }

    async fn download_files(
        &self,
        request: &DownloadRequest,
        timeout: CallTimeout,
    ) -> Result<Box<dyn TransferFeed>, GatewayError> {
        self.record("DownloadFiles", timeout)?;
        self.downloads.lock().unwrap().push(request.clone());
        Ok(self.next_transfer())
    }

    async fn set_models(
        &self,
        request: &SetModelsRequest,
        timeout: CallTimeout,
    ) -> Result<String, GatewayError> {
        self.record("SetModels", timeout)?;
        self.set_models_requests.lock().unwrap().push(request.clone());
        Ok("models set".to_string())
    }

    async fn close(&self) -> Result<(), GatewayError> {
        *self.closed.lock().unwrap() += 1;
        Ok(())
    }
}
