//! Generation parameters for the middleware's RAG pipeline.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// System message the middleware uses for retrieval-augmented answers.
pub const DEFAULT_RAG_SYSTEM_MESSAGE: &str = concat!(
    "Using the information contained in the context, ",
    "give a comprehensive answer to the question.\n\n",
    "Please provide answer with full sentence, ",
    "and don't end a sentence with colon.\n\n",
    "If the context is not relevant, ",
    "please answer the question by using your own knowledge about the topic."
);

/// Sampling and retrieval settings sent with `SetParameters`.
///
/// Field names match the middleware's request fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParameters {
    pub max_token: u32,
    pub temperature: f32,
    pub retriever_top_k: u32,
    pub reranker_top_k: u32,
    pub reranker_threshold: f32,
    pub max_num_references: u32,
    pub reference_threshold: f32,
    pub input_prompt_safety_threshold: f32,
    pub streaming_batch_size: u32,
    pub rag_system_message: String,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_token: 1024,
            temperature: 1.0,
            retriever_top_k: 13,
            reranker_top_k: 4,
            reranker_threshold: 0.0,
            max_num_references: 2,
            reference_threshold: 0.1,
            input_prompt_safety_threshold: 0.75,
            streaming_batch_size: 1,
            rag_system_message: DEFAULT_RAG_SYSTEM_MESSAGE.to_string(),
        }
    }
}

impl GenerationParameters {
    /// Check ranges before anything is sent.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_token == 0 {
            return Err(DomainError::InvalidParameter(
                "max_token must be greater than 0".to_string(),
            ));
        }
        if self.streaming_batch_size == 0 {
            return Err(DomainError::InvalidParameter(
                "streaming_batch_size must be greater than 0".to_string(),
            ));
        }
        if self.temperature.is_nan() || self.temperature < 0.0 {
            return Err(DomainError::InvalidParameter(format!(
                "temperature must be >= 0, got {}",
                self.temperature
            )));
        }
        for (name, value) in [
            ("reranker_threshold", self.reranker_threshold),
            ("reference_threshold", self.reference_threshold),
            ("input_prompt_safety_threshold", self.input_prompt_safety_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DomainError::InvalidParameter(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
