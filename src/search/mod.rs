//! Hybrid Retriever (`spec.md` §4.C): fuses dense-vector and BM25 rankings
//! with Reciprocal Rank Fusion, then optionally reranks.

pub mod bm25;
pub mod rrf;

use std::collections::HashMap;

use serde_json::json;

use crate::config::{RRF_K, TOP_K_FINAL, TOP_K_RERANK, TOP_K_RETRIEVE};
use crate::embedding::EmbeddingBackend;
use crate::error::Result;
use crate::logging::Logger;
use crate::rerank::Reranker;
use crate::vectorstore::{MetadataFilter, VectorStore};

/// Name of the single collection this engine maintains (`spec.md` §3).
pub const COLLECTION_NAME: &str = "rag_docs";

/// Tunables for one hybrid retrieval call.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Candidates pulled from each of the dense/lexical lists before fusion.
    pub top_k_retrieve: usize,
    /// Documents returned when not reranking.
    pub top_k_final: usize,
    /// Documents returned after reranking.
    pub top_k_rerank: usize,
    /// RRF damping constant.
    pub rrf_k: u32,
    /// Whether to rerank the fused candidates.
    pub use_rerank: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k_retrieve: TOP_K_RETRIEVE,
            top_k_final: TOP_K_FINAL,
            top_k_rerank: TOP_K_RERANK,
            rrf_k: RRF_K,
            use_rerank: false,
        }
    }
}

/// Runs the full hybrid retrieval pipeline and returns ordered document
/// contents (`spec.md` §4.C).
///
/// # Errors
///
/// Propagates embedding failures; callers treat this as "no document
/// context" per §7 and fall back to whatever other context exists. Vector
/// store and reranker failures are handled internally (empty dense list /
/// rerank fallback respectively) and never reach this return. When
/// `logger` is given, a reranker failure is recorded as a `rerank_fallback`
/// event before falling back to unranked order.
#[allow(clippy::too_many_arguments)]
pub fn hybrid_search(
    store: &dyn VectorStore,
    embedder: &dyn EmbeddingBackend,
    embedding_model: &str,
    reranker: Option<&dyn Reranker>,
    query: &str,
    filter: &MetadataFilter,
    config: &SearchConfig,
    logger: Option<&Logger>,
) -> Result<Vec<String>> {
    let embedding = embedder.embed(embedding_model, query)?;

    let dense_hits = store
        .query(COLLECTION_NAME, &embedding, config.top_k_retrieve, filter)
        .unwrap_or_default();
    let vec_ids: Vec<String> = dense_hits.iter().map(|c| c.id.clone()).collect();

    let mut corpus = store.get(COLLECTION_NAME, filter).unwrap_or_default();
    corpus.sort_by(|a, b| a.id.cmp(&b.id));

    let query_tokens = bm25::tokenize(query);
    let doc_tokens: Vec<Vec<String>> = corpus
        .iter()
        .map(|c| bm25::tokenize(&c.document))
        .collect();
    let scores = bm25::score_all(&query_tokens, &doc_tokens);
    let top_lexical_indices = bm25::top_n_by_score(&scores, config.top_k_retrieve);
    let bm25_ids: Vec<String> = top_lexical_indices
        .into_iter()
        .map(|i| corpus[i].id.clone())
        .collect();

    let fused_ids = rrf::fuse_top_ids(&[vec_ids, bm25_ids], config.rrf_k, config.top_k_retrieve);

    let mut documents_by_id: HashMap<String, String> = HashMap::new();
    for chunk in dense_hits {
        documents_by_id.entry(chunk.id).or_insert(chunk.document);
    }
    for chunk in corpus {
        documents_by_id.entry(chunk.id).or_insert(chunk.document);
    }

    let fused_docs: Vec<String> = fused_ids
        .into_iter()
        .filter_map(|id| documents_by_id.get(&id).cloned())
        .collect();

    if config.use_rerank && fused_docs.len() > config.top_k_final {
        if let Some(reranker) = reranker {
            match reranker.rerank(query, &fused_docs, config.top_k_rerank) {
                Ok(reranked) => return Ok(reranked),
                Err(e) => {
                    if let Some(logger) = logger {
                        logger.event(
                            "rerank_fallback",
                            json!({"reranker": reranker.name(), "error": e.to_string()}),
                        );
                    }
                }
            }
        }
    }
    Ok(fused_docs.into_iter().take(config.top_k_final).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorstore::{ChunkMetadata, SqliteVectorStore};

    struct StubEmbedder;
    impl EmbeddingBackend for StubEmbedder {
        fn name(&self) -> &'static str {
            "stub"
        }
        fn embed(&self, _model: &str, text: &str) -> Result<Vec<f32>> {
            // Deterministic pseudo-embedding: presence of "cat" vs "dog".
            Ok(vec![
                if text.contains("cat") { 1.0 } else { 0.0 },
                if text.contains("dog") { 1.0 } else { 0.0 },
            ])
        }
    }

    fn meta(source: &str) -> ChunkMetadata {
        ChunkMetadata {
            source: source.to_string(),
            file_type: "txt".to_string(),
            chunk_id: 0,
            page: None,
            section: None,
        }
    }

    #[test]
    fn empty_corpus_returns_empty_result() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let store = SqliteVectorStore::open(dir.path()).unwrap_or_else(|_| unreachable!());
        let result = hybrid_search(
            &store,
            &StubEmbedder,
            "m",
            None,
            "cat",
            &MetadataFilter::All,
            &SearchConfig::default(),
            None,
        )
        .unwrap_or_else(|_| unreachable!());
        assert!(result.is_empty());
    }

    #[test]
    fn filter_selecting_nothing_returns_empty() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let store = SqliteVectorStore::open(dir.path()).unwrap_or_else(|_| unreachable!());
        store
            .add(
                COLLECTION_NAME,
                &[("a".to_string(), vec![1.0, 0.0], "cat food".to_string(), meta("/a.txt"))],
            )
            .unwrap_or_else(|_| unreachable!());
        let filter = MetadataFilter::Equals {
            field: "source",
            value: "/nonexistent.txt".to_string(),
        };
        let result = hybrid_search(
            &store,
            &StubEmbedder,
            "m",
            None,
            "cat",
            &filter,
            &SearchConfig::default(),
            None,
        )
        .unwrap_or_else(|_| unreachable!());
        assert!(result.is_empty());
    }

    #[test]
    fn retrieves_and_fuses_dense_and_lexical_hits() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let store = SqliteVectorStore::open(dir.path()).unwrap_or_else(|_| unreachable!());
        store
            .add(
                COLLECTION_NAME,
                &[
                    ("a".to_string(), vec![1.0, 0.0], "all about cats and kittens".to_string(), meta("/a.txt")),
                    ("b".to_string(), vec![0.0, 1.0], "all about dogs and puppies".to_string(), meta("/b.txt")),
                ],
            )
            .unwrap_or_else(|_| unreachable!());
        let result = hybrid_search(
            &store,
            &StubEmbedder,
            "m",
            None,
            "cat",
            &MetadataFilter::All,
            &SearchConfig::default(),
            None,
        )
        .unwrap_or_else(|_| unreachable!());
        assert_eq!(result[0], "all about cats and kittens");
    }
}
