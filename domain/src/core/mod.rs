//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level errors
//! - [`timeout::CallTimeout`]: explicit per-call timeout policy

pub mod error;
pub mod timeout;
