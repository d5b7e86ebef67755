//! Infrastructure layer for superbuilder-client
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod middleware;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileClientConfig, FileConfig, FileConnectionConfig,
    FileOutputConfig,
};
pub use middleware::{
    error::{MiddlewareError, Result},
    gateway::GrpcMiddlewareGateway,
    session::{DEFAULT_ADDRESS, SecurityMode, SessionOptions},
};
