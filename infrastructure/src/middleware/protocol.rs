//! SuperBuilder gRPC messages.
//!
//! [`pb`] is generated from `proto/superbuilder_middleware.proto` at build
//! time. The conversions below turn validated domain requests into the
//! generated messages; nothing else in the crate builds them by hand.
//!
//! Operation names used in logs and errors are the RPC names (`SayHello`,
//! `Chat`, ...), listed in [`methods`].

use sb_domain::{
    ChatRequest, DownloadRequest, GenerationParameters, SessionId, SetActiveAssistantRequest,
    SetModelsRequest,
};

/// Generated messages, client and server for the `SuperBuilder` service.
#[allow(clippy::all)]
pub mod pb {
    tonic::include_proto!("super_builder_win_service");
}

/// Remote operation names.
pub mod methods {
    pub const SAY_HELLO: &str = "SayHello";
    pub const SAY_HELLO_PYLLM: &str = "SayHelloPyllm";
    pub const GET_CHAT_HISTORY: &str = "GetChatHistory";
    pub const GET_CLIENT_CONFIG: &str = "GetClientConfig";
    pub const SET_ACTIVE_ASSISTANT: &str = "SetActiveAssistant";
    pub const CHAT: &str = "Chat";
    pub const STOP_CHAT: &str = "StopChat";
    pub const LOAD_MODELS: &str = "LoadModels";
    pub const REMOVE_SESSION: &str = "RemoveSession";
    pub const SET_PARAMETERS: &str = "SetParameters";
    pub const ADD_FILES: &str = "AddFiles";
    pub const REMOVE_FILES: &str = "RemoveFiles";
    pub const GET_FILE_LIST: &str = "GetFileList";
    pub const DOWNLOAD_FILES: &str = "DownloadFiles";
    pub const SET_MODELS: &str = "SetModels";
    pub const CLIENT_DISCONNECTED: &str = "ClientDisconnected";
}

impl From<&ChatRequest> for pb::ChatRequest {
    fn from(request: &ChatRequest) -> Self {
        Self {
            name: request.name().to_string(),
            prompt: request.prompt().to_string(),
            history: Vec::new(),
            session_id: request.session_id().value(),
            attached_files: Some(request.attached_files_wire()),
            query_type: request.query_type().map(str::to_string),
        }
    }
}

impl From<&SetActiveAssistantRequest> for pb::SetActiveAssistantRequest {
    fn from(request: &SetActiveAssistantRequest) -> Self {
        Self {
            assistant: request.assistant.clone(),
            models_json: request.models_json.clone(),
        }
    }
}

impl From<SessionId> for pb::RemoveSessionRequest {
    fn from(session_id: SessionId) -> Self {
        Self {
            session_id: session_id.value(),
        }
    }
}

/// Counts saturate at `i32::MAX`; the middleware's fields are 32-bit signed.
fn int32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl From<&GenerationParameters> for pb::SetParametersRequest {
    fn from(parameters: &GenerationParameters) -> Self {
        Self {
            max_token: int32(parameters.max_token),
            temperature: parameters.temperature,
            retriever_top_k: int32(parameters.retriever_top_k),
            reranker_top_k: int32(parameters.reranker_top_k),
            reranker_threshold: parameters.reranker_threshold,
            max_num_references: int32(parameters.max_num_references),
            reference_threshold: parameters.reference_threshold,
            input_prompt_safety_threshold: parameters.input_prompt_safety_threshold,
            streaming_batch_size: int32(parameters.streaming_batch_size),
            rag_system_message: parameters.rag_system_message.clone(),
        }
    }
}

impl From<&DownloadRequest> for pb::DownloadFilesRequest {
    fn from(request: &DownloadRequest) -> Self {
        Self {
            file_url: request.file_url.clone(),
            local_path: request.local_path.clone(),
        }
    }
}

impl From<&SetModelsRequest> for pb::SetModelsRequest {
    fn from(request: &SetModelsRequest) -> Self {
        Self {
            llm: request.llm.clone(),
            embedder: request.embedder.clone(),
            ranker: request.ranker.clone(),
            assistant: request.assistant.clone(),
        }
    }
}
