//! Domain layer for superbuilder-client
//!
//! This crate contains the value objects and entities exchanged with the
//! SuperBuilder middleware. It performs no I/O.
//!
//! # Core Concepts
//!
//! ## Assistant
//!
//! The middleware serves one *active assistant*: a named bundle of three
//! models, one per [`ModelRole`] (embedding, ranker, chat), chosen from a
//! catalog of every model it can activate. [`ClientConfig`] parses the
//! configuration read; [`AssistantConfig`] changes selections and produces
//! the configuration write.
//!
//! ## Chat
//!
//! A [`ChatRequest`] carries a prompt under a fresh random [`SessionId`].
//! The reply arrives as a stream of [`ChatFragment`]s whose progress is
//! tracked by [`ChatStreamState`].
//!
//! ## Knowledge base and model hub
//!
//! Uploads take a [`FileBatch`] of absolute paths; uploads and model
//! downloads both report progress as [`TransferUpdate`]s.

pub mod assistant;
pub mod chat;
pub mod core;
pub mod knowledge;
pub mod parameters;

// Re-export commonly used types
pub use assistant::{
    config::{AssistantConfig, ClientConfig, ModelSelection},
    descriptor::ModelDescriptor,
    hub::{DownloadRequest, SetModelsRequest},
    request::SetActiveAssistantRequest,
    role::ModelRole,
};
pub use chat::{
    fragment::ChatFragment,
    history::{ChatHistory, ChatSessionSummary},
    request::{ChatRequest, DEFAULT_CLIENT_NAME},
    session_id::SessionId,
    state::{ChatPhase, ChatStreamState},
};
pub use core::{
    error::DomainError,
    timeout::{CallTimeout, DEFAULT_CALL_TIMEOUT},
};
pub use knowledge::{
    files::{FileBatch, FileList},
    transfer::TransferUpdate,
};
pub use parameters::{DEFAULT_RAG_SYSTEM_MESSAGE, GenerationParameters};
