//! Application layer for superbuilder-client
//!
//! This crate contains the middleware port, request building, the chat
//! and transfer stream consumers, and the [`MiddlewareClient`] façade.
//! It depends only on the domain layer.

pub mod chat_stream;
pub mod client;
pub mod config;
pub mod error;
pub mod ports;
pub mod request_builder;
pub mod transfer;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use chat_stream::{ChatReply, ChatStream};
pub use client::{MiddlewareClient, ModelDownload};
pub use config::ClientOptions;
pub use error::ClientError;
pub use ports::{
    middleware_gateway::{
        FragmentStream, GatewayError, MiddlewareGateway, StreamFrame, TransferFeed, TransferFrame,
    },
    progress::{NoProgress, ProgressNotifier},
};
pub use request_builder::{ChatOptions, RequestBuilder};
pub use transfer::{TransferReport, TransferStream};
