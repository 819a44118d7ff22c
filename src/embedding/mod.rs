//! Embedding backend contract and reference implementation.

pub mod ollama;

pub use ollama::OllamaEmbeddingBackend;

use crate::error::Result;

/// Trait for text embedding backends.
pub trait EmbeddingBackend: Send + Sync {
    /// Backend name, used in log events.
    fn name(&self) -> &'static str;

    /// Embeds `text` under `model`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::RagError::EmbeddingUnavailable`] if the
    /// request fails and, when `model` is not already `all-minilm`, the
    /// `all-minilm` fallback retry also fails (§6).
    fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>>;
}
