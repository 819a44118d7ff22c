//! Ollama-compatible embedding backend (`POST {base_url}/api/embeddings`).
//!
//! Reference implementation of §6 "Embedding backend": truncates input to
//! [`crate::config::EMBEDDING_INPUT_MAX_CHARS`] characters, and on failure
//! with any model other than `all-minilm`, retries once with `all-minilm`
//! before propagating.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_EMBEDDING_FALLBACK_MODEL, EMBEDDING_INPUT_MAX_CHARS, EMBEDDING_TIMEOUT};
use crate::embedding::EmbeddingBackend;
use crate::error::{RagError, Result};

/// Embedding backend talking to an Ollama-compatible server over HTTP.
#[derive(Debug, Clone)]
pub struct OllamaEmbeddingBackend {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl OllamaEmbeddingBackend {
    /// Builds a backend targeting `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn request_once(&self, model: &str, prompt: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct WireRequest<'a> {
            model: &'a str,
            prompt: &'a str,
        }
        #[derive(Deserialize)]
        struct WireResponse {
            embedding: Vec<f32>,
        }

        let url = format!("{}/api/embeddings", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(&url)
            .json(&WireRequest { model, prompt })
            .timeout(EMBEDDING_TIMEOUT)
            .send()
            .map_err(|e| RagError::EmbeddingUnavailable {
                message: format!("request to {url} failed: {e}"),
            })?;

        if !resp.status().is_success() {
            return Err(RagError::EmbeddingUnavailable {
                message: format!("{url} returned status {}", resp.status()),
            });
        }

        let body: WireResponse = resp.json().map_err(|e| RagError::EmbeddingUnavailable {
            message: format!("invalid response body from {url}: {e}"),
        })?;
        Ok(body.embedding)
    }
}

/// Truncates `text` to at most `EMBEDDING_INPUT_MAX_CHARS` characters,
/// respecting UTF-8 boundaries.
#[must_use]
pub fn truncate_for_embedding(text: &str) -> &str {
    match text.char_indices().nth(EMBEDDING_INPUT_MAX_CHARS) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

impl EmbeddingBackend for OllamaEmbeddingBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let prompt = truncate_for_embedding(text);
        match self.request_once(model, prompt) {
            Ok(v) => Ok(v),
            Err(_) if model != DEFAULT_EMBEDDING_FALLBACK_MODEL => {
                self.request_once(DEFAULT_EMBEDDING_FALLBACK_MODEL, prompt)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_is_noop_under_limit() {
        let text = "short text";
        assert_eq!(truncate_for_embedding(text), text);
    }

    #[test]
    fn truncate_cuts_at_exact_char_limit() {
        let text = "a".repeat(EMBEDDING_INPUT_MAX_CHARS + 500);
        let truncated = truncate_for_embedding(&text);
        assert_eq!(truncated.chars().count(), EMBEDDING_INPUT_MAX_CHARS);
    }

    #[test]
    fn truncate_respects_multibyte_boundaries() {
        let text = "é".repeat(EMBEDDING_INPUT_MAX_CHARS + 10);
        let truncated = truncate_for_embedding(&text);
        assert_eq!(truncated.chars().count(), EMBEDDING_INPUT_MAX_CHARS);
        assert!(truncated.is_char_boundary(truncated.len()));
    }
}
