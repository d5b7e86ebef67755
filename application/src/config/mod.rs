//! Application-level configuration.
//!
//! - [`ClientOptions`]: client display name and the bound for quick calls

pub mod client_options;

pub use client_options::ClientOptions;
