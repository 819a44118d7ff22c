//! Reranking stage (`spec.md` §4.C step 6, §9 Open Questions).
//!
//! No real cross-encoder model is in this dependency stack, so
//! [`HeuristicReranker`] stands in as the reference implementation: a
//! lexical-overlap scorer over the same tokens BM25 uses. Real deployments
//! swap in a model-backed `Reranker` without touching the retriever.

use crate::error::Result;
use crate::search::bm25::tokenize;

/// Reorders `documents` by relevance to `query`, returning at most `top_k`.
///
/// Implementations must never panic or abort the query path: a failure
/// (model unavailable, backend timeout, ...) is surfaced as
/// [`crate::error::RagError::RerankUnavailable`] so the caller can log a
/// `rerank_fallback` event and fall back to unranked order, per §4.D/§7.
pub trait Reranker: Send + Sync {
    /// Human-readable backend name, used in structured log events.
    fn name(&self) -> &'static str;

    /// Reranks `documents` against `query`, returning at most `top_k` of
    /// them in descending relevance order.
    fn rerank(&self, query: &str, documents: &[String], top_k: usize) -> Result<Vec<String>>;
}

/// Scores each document by the fraction of distinct query tokens it
/// contains, breaking ties by original (fused) order. A purely local
/// computation: it never fails, so `rerank` always returns `Ok`.
pub struct HeuristicReranker;

impl Reranker for HeuristicReranker {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn rerank(&self, query: &str, documents: &[String], top_k: usize) -> Result<Vec<String>> {
        let query_terms: std::collections::HashSet<String> =
            tokenize(query).into_iter().collect();
        if query_terms.is_empty() {
            return Ok(documents.iter().take(top_k).cloned().collect());
        }

        let mut scored: Vec<(usize, f32)> = documents
            .iter()
            .enumerate()
            .map(|(i, doc)| {
                let doc_terms: std::collections::HashSet<String> =
                    tokenize(doc).into_iter().collect();
                let overlap = query_terms.intersection(&doc_terms).count();
                (i, overlap as f32 / query_terms.len() as f32)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(i, _)| documents[i].clone())
            .collect())
    }
}
