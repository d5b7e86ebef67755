//! Chat domain.
//!
//! - [`request::ChatRequest`]: a validated prompt with its session id and attachments
//! - [`session_id::SessionId`]: random per-exchange identifier
//! - [`fragment::ChatFragment`]: one decoded piece of a streamed reply
//! - [`state::ChatStreamState`]: phase and accumulation of one stream
//! - [`history::ChatHistory`]: past sessions reported by the middleware

pub mod fragment;
pub mod history;
pub mod request;
pub mod session_id;
pub mod state;
