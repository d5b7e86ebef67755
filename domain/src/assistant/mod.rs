//! Assistant configuration domain.
//!
//! - [`role::ModelRole`]: embedding / ranker / chat
//! - [`descriptor::ModelDescriptor`]: one model in the catalog
//! - [`config::AssistantConfig`]: the active assistant, its selection and catalog
//! - [`config::ClientConfig`]: the whole configuration-read payload
//! - [`request::SetActiveAssistantRequest`]: the configuration write
//! - [`hub::DownloadRequest`], [`hub::SetModelsRequest`]: model hub requests

pub mod config;
pub mod descriptor;
pub mod hub;
pub mod request;
pub mod role;
