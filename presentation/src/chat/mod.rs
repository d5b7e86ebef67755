//! Streaming chat output

mod printer;

pub use printer::ChatPrinter;
