//! Runtime configuration with builder pattern and environment variable support.
//!
//! Resolution order: explicit builder calls → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Default embedding model passed to the Ollama-style embedding backend.
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
/// Fallback embedding model used after one retry (§6 "Embedding backend").
pub const DEFAULT_EMBEDDING_FALLBACK_MODEL: &str = "all-minilm";
/// Default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "llama3.1";
/// Default Ollama-compatible base URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Default number of candidates pulled from each of the dense/lexical lists.
pub const TOP_K_RETRIEVE: usize = 20;
/// Default number of documents returned by the retriever/orchestrator.
pub const TOP_K_FINAL: usize = 5;
/// Number of candidates kept after reranking.
pub const TOP_K_RERANK: usize = 5;
/// RRF damping constant, fixed throughout the pipeline.
pub const RRF_K: u32 = 60;
/// Default number of alternative phrasings generated by query expansion.
pub const EXPANSION_VARIANTS: usize = 2;
/// Maximum web search snippets considered.
pub const WEB_SNIPPET_MAX: usize = 8;
/// Maximum number of web results fully fetched (rest stay snippet-only).
pub const WEB_FETCH_MAX: usize = 3;
/// Web page body truncation applied immediately after fetch.
pub const WEB_FETCH_MAX_CHARS: usize = 8000;
/// Second, tighter truncation applied before insertion into the prompt.
pub const WEB_CONTEXT_MAX_CHARS: usize = 4000;
/// Characters of chunk text sent to the embedding backend per request.
pub const EMBEDDING_INPUT_MAX_CHARS: usize = 8000;
/// Result cache time-to-live.
pub const CACHE_TTL: Duration = Duration::from_secs(300);
/// Embedding backend request timeout.
pub const EMBEDDING_TIMEOUT: Duration = Duration::from_secs(60);
/// Chat backend request timeout.
pub const CHAT_TIMEOUT: Duration = Duration::from_secs(120);
/// Web fetch/search request timeout.
pub const WEB_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolved configuration for a single run of the engine.
#[derive(Debug, Clone)]
pub struct RagConfig {
    /// Base URL of the Ollama-compatible embedding/chat server.
    pub ollama_url: String,
    /// Directory holding the vector store, manifest, and eval outputs.
    pub index_dir: PathBuf,
    /// Embedding model name.
    pub embedding_model: String,
    /// Chat model name.
    pub chat_model: String,
    /// Redis connection string for the distributed result cache, if any.
    pub redis_url: Option<String>,
    /// Whether to prefer the Jina Reader proxy for URL fetches.
    pub use_jina: bool,
    /// Latency threshold (ms) above which an alert is emitted, if a webhook is set.
    pub alert_latency_ms: Option<u64>,
    /// Webhook URL to POST alerts to.
    pub alert_webhook: Option<String>,
}

impl RagConfig {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Builds configuration from environment variables with defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::builder().from_env().build()
    }
}

/// Builder for [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    ollama_url: Option<String>,
    index_dir: Option<PathBuf>,
    embedding_model: Option<String>,
    chat_model: Option<String>,
    redis_url: Option<String>,
    use_jina: Option<bool>,
    alert_latency_ms: Option<u64>,
    alert_webhook: Option<String>,
}

impl RagConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.ollama_url.is_none() {
            self.ollama_url = std::env::var("OLLAMA_URL").ok();
        }
        if self.redis_url.is_none() {
            self.redis_url = std::env::var("RAG_REDIS_URL").ok();
        }
        if self.use_jina.is_none() {
            self.use_jina = std::env::var("RAG_USE_JINA")
                .ok()
                .map(|v| parse_truthy(&v));
        }
        if self.alert_latency_ms.is_none() {
            self.alert_latency_ms = std::env::var("RAG_ALERT_LATENCY_MS")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.alert_webhook.is_none() {
            self.alert_webhook = std::env::var("RAG_ALERT_WEBHOOK").ok();
        }
        self
    }

    /// Sets the Ollama-compatible base URL.
    #[must_use]
    pub fn ollama_url(mut self, url: impl Into<String>) -> Self {
        self.ollama_url = Some(url.into());
        self
    }

    /// Sets the index directory.
    #[must_use]
    pub fn index_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.index_dir = Some(dir.into());
        self
    }

    /// Sets the embedding model name.
    #[must_use]
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = Some(model.into());
        self
    }

    /// Sets the chat model name.
    #[must_use]
    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = Some(model.into());
        self
    }

    /// Sets the Redis URL for the distributed cache.
    #[must_use]
    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = Some(url.into());
        self
    }

    /// Sets whether to prefer the Jina Reader proxy for fetches.
    #[must_use]
    pub const fn use_jina(mut self, use_jina: bool) -> Self {
        self.use_jina = Some(use_jina);
        self
    }

    /// Builds the [`RagConfig`], filling any unset field with its default.
    #[must_use]
    pub fn build(self) -> RagConfig {
        RagConfig {
            ollama_url: self
                .ollama_url
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            index_dir: self.index_dir.unwrap_or_else(|| PathBuf::from(".rag_index")),
            embedding_model: self
                .embedding_model
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            chat_model: self.chat_model.unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            redis_url: self.redis_url,
            use_jina: self.use_jina.unwrap_or(true),
            alert_latency_ms: self.alert_latency_ms,
            alert_webhook: self.alert_webhook,
        }
    }
}

/// Parses an environment-variable boolean the way shell scripts usually do:
/// `0`/`false`/`no`/`off` (case-insensitive) are falsy, everything else — including
/// an empty string — is truthy.
fn parse_truthy(v: &str) -> bool {
    !matches!(v.to_lowercase().as_str(), "0" | "false" | "no" | "off")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = RagConfig::builder().build();
        assert_eq!(config.ollama_url, DEFAULT_OLLAMA_URL);
        assert_eq!(config.embedding_model, DEFAULT_EMBEDDING_MODEL);
        assert_eq!(config.chat_model, DEFAULT_CHAT_MODEL);
        assert!(config.use_jina);
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn builder_custom_values() {
        let config = RagConfig::builder()
            .ollama_url("http://example:1234")
            .embedding_model("bge-m3")
            .use_jina(false)
            .build();
        assert_eq!(config.ollama_url, "http://example:1234");
        assert_eq!(config.embedding_model, "bge-m3");
        assert!(!config.use_jina);
    }

    #[test_case::test_case("0", false; "zero")]
    #[test_case::test_case("false", false; "false word")]
    #[test_case::test_case("FALSE", false; "false uppercase")]
    #[test_case::test_case("no", false; "no")]
    #[test_case::test_case("off", false; "off")]
    #[test_case::test_case("1", true; "one")]
    #[test_case::test_case("true", true; "true word")]
    #[test_case::test_case("yes", true; "yes")]
    #[test_case::test_case("", true; "empty is truthy")]
    fn truthy_parsing(input: &str, expected: bool) {
        assert_eq!(parse_truthy(input), expected);
    }
}
