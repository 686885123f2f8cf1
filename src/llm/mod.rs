//! Generation backend clients.

pub mod ollama;

use async_trait::async_trait;

use crate::error::GenerationError;

pub use ollama::OllamaGenerator;

/// A text-generation backend.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Produce a single completion for `prompt` using `model`.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError>;
}

/// Prompt sent to the generation backend for a retrieval-augmented answer.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!("Context:\n{context}\n\nQuestion: {question}\n\nAnswer clearly and concisely:")
}
