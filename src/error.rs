//! Crate-wide error type.
//!
//! One variant per error kind named in the retrieval pipeline's contract.
//! Most variants are produced only at the boundary where a component gives
//! up on a documented local recovery (embedding model fallback, rerank
//! fallback, Jina→direct fetch, Redis→in-process cache, …) — see each
//! module's doc comments for which failures are swallowed before they ever
//! become a [`RagError`].

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RagError>;

/// Errors surfaced by the retrieval and generation pipeline.
#[derive(Debug, Error)]
pub enum RagError {
    /// A source file's extension has no registered [`crate::loader::Loader`].
    #[error("unsupported document format: {message}")]
    FormatUnsupported {
        /// Human-readable detail.
        message: String,
    },

    /// A source path given to the indexer does not exist.
    #[error("source missing: {message}")]
    SourceMissing {
        /// Human-readable detail.
        message: String,
    },

    /// The embedding backend failed, including the `all-minilm` fallback.
    #[error("embedding backend unavailable: {message}")]
    EmbeddingUnavailable {
        /// Human-readable detail.
        message: String,
    },

    /// The chat backend failed.
    #[error("chat backend unavailable: {message}")]
    ChatUnavailable {
        /// Human-readable detail.
        message: String,
    },

    /// The vector store failed to perform a requested operation.
    #[error("vector store error: {message}")]
    VectorStoreError {
        /// Human-readable detail.
        message: String,
    },

    /// The web search provider failed.
    #[error("web search error: {message}")]
    WebSearchError {
        /// Human-readable detail.
        message: String,
    },

    /// A URL fetch failed.
    #[error("fetch error: {message}")]
    FetchError {
        /// Human-readable detail.
        message: String,
    },

    /// The reranker failed to load or run.
    #[error("rerank unavailable: {message}")]
    RerankUnavailable {
        /// Human-readable detail.
        message: String,
    },

    /// The result cache backend (e.g. Redis) is unreachable.
    #[error("cache unavailable: {message}")]
    CacheUnavailable {
        /// Human-readable detail.
        message: String,
    },

    /// The evaluation dataset could not be read or parsed.
    #[error("eval dataset error: {message}")]
    EvalDatasetError {
        /// Human-readable detail.
        message: String,
    },

    /// Wraps an I/O failure with additional context.
    #[error("io error ({hint}): {source}")]
    Io {
        /// What operation was being attempted.
        hint: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Wraps a JSON (de)serialization failure with additional context.
    #[error("json error ({hint}): {source}")]
    Json {
        /// What was being (de)serialized.
        hint: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

impl RagError {
    /// Shorthand for [`RagError::Io`].
    #[must_use]
    pub fn io(hint: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            hint: hint.into(),
            source,
        }
    }

    /// Shorthand for [`RagError::Json`].
    #[must_use]
    pub fn json(hint: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            hint: hint.into(),
            source,
        }
    }

    /// The error-kind name used in structured log events, e.g. `"rerank_unavailable"`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::FormatUnsupported { .. } => "format_unsupported",
            Self::SourceMissing { .. } => "source_missing",
            Self::EmbeddingUnavailable { .. } => "embedding_unavailable",
            Self::ChatUnavailable { .. } => "chat_unavailable",
            Self::VectorStoreError { .. } => "vector_store_error",
            Self::WebSearchError { .. } => "web_search_error",
            Self::FetchError { .. } => "fetch_error",
            Self::RerankUnavailable { .. } => "rerank_unavailable",
            Self::CacheUnavailable { .. } => "cache_unavailable",
            Self::EvalDatasetError { .. } => "eval_dataset_error",
            Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_match_error_family() {
        let err = RagError::RerankUnavailable {
            message: "model load failed".to_string(),
        };
        assert_eq!(err.kind(), "rerank_unavailable");
        assert!(err.to_string().contains("model load failed"));
    }
}
