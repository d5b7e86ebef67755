//! Presentation layer for superbuilder-client
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and the streaming chat printer.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::ChatPrinter;
pub use cli::commands::{Cli, Command, ConfigCommand, FilesCommand, ModelCommand};
pub use config::OutputConfig;
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
