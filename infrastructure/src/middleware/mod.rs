//! SuperBuilder middleware adapter
//!
//! Implements MiddlewareGateway with the generated gRPC client over one tonic channel.

pub mod error;
pub mod gateway;
pub mod protocol;
pub mod session;

#[cfg(test)]
pub(crate) mod fake_server;
