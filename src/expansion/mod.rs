//! Query-Expansion Orchestrator (`spec.md` §4.E).

use std::collections::HashMap;

use serde_json::json;

use crate::chat::{ChatBackend, ChatRequest, system_message, user_message};
use crate::config::{EXPANSION_VARIANTS, RRF_K, TOP_K_FINAL, TOP_K_RETRIEVE};
use crate::embedding::EmbeddingBackend;
use crate::logging::Logger;
use crate::rerank::Reranker;
use crate::search::{self, SearchConfig};
use crate::search::rrf;
use crate::vectorstore::{MetadataFilter, VectorStore};

/// Default number of alternative phrasings requested from the chat backend.
pub const DEFAULT_VARIANT_COUNT: usize = EXPANSION_VARIANTS;
const FUSED_TOP_K: usize = TOP_K_RETRIEVE;
const FINAL_TOP_K: usize = TOP_K_FINAL;

const EXPANSION_PROMPT_TEMPLATE: &str = "Produce {n} alternative phrasings of the following \
search query, one per line, in the same language as the query. Return only the phrasings, no \
numbering or commentary.\n\nQuery: {query}";

/// Asks the chat backend for alternative phrasings, filters them per
/// §4.E step 2, and prepends the original. Degrades to `[original]` on any
/// chat-backend failure.
#[must_use]
pub fn generate_variants(chat: &dyn ChatBackend, model: &str, query: &str, n: usize) -> Vec<String> {
    let prompt = EXPANSION_PROMPT_TEMPLATE
        .replace("{n}", &n.to_string())
        .replace("{query}", query);
    let request = ChatRequest {
        model: model.to_string(),
        messages: vec![
            system_message("You rewrite search queries into alternative phrasings."),
            user_message(prompt),
        ],
    };

    let Ok(response) = chat.chat(&request) else {
        return vec![query.to_string()];
    };

    let mut variants = vec![query.to_string()];
    let original_lower = query.trim().to_lowercase();
    for line in response.content.lines() {
        let candidate = line.trim().trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == '-' || c == ')' || c == ' ');
        let candidate = candidate.trim();
        if candidate.len() > 5 && candidate.to_lowercase() != original_lower {
            variants.push(candidate.to_string());
        }
    }
    variants
}

/// Runs hybrid retrieval for every variant and fuses the results by RRF,
/// keyed on document content (`spec.md` §4.E step 5).
///
/// Falls through to a single plain retrieval when only the original query
/// survived variant generation.
#[allow(clippy::too_many_arguments)]
pub fn expanded_search(
    store: &dyn VectorStore,
    embedder: &dyn EmbeddingBackend,
    embedding_model: &str,
    chat: &dyn ChatBackend,
    chat_model: &str,
    reranker: Option<&dyn Reranker>,
    query: &str,
    filter: &MetadataFilter,
    use_rerank: bool,
    logger: Option<&Logger>,
) -> crate::error::Result<Vec<String>> {
    let variants = generate_variants(chat, chat_model, query, DEFAULT_VARIANT_COUNT);

    if variants.len() == 1 {
        let mut config = SearchConfig::default();
        config.use_rerank = use_rerank;
        return search::hybrid_search(
            store,
            embedder,
            embedding_model,
            reranker,
            query,
            filter,
            &config,
            logger,
        );
    }

    let per_variant_config = SearchConfig {
        use_rerank: false,
        ..SearchConfig::default()
    };

    let mut lists: Vec<Vec<String>> = Vec::new();
    for variant in &variants {
        let docs = search::hybrid_search(
            store,
            embedder,
            embedding_model,
            None,
            variant,
            filter,
            &per_variant_config,
            logger,
        )
        .unwrap_or_default();
        lists.push(docs);
    }

    // RRF over document content: assign each distinct document text a
    // synthetic id so `rrf::fuse_top_ids` can operate unmodified.
    let mut content_to_id: HashMap<String, String> = HashMap::new();
    let mut id_lists: Vec<Vec<String>> = Vec::new();
    for list in &lists {
        let mut id_list = Vec::new();
        for doc in list {
            let next_id = content_to_id.len().to_string();
            let id = content_to_id.entry(doc.clone()).or_insert(next_id).clone();
            id_list.push(id);
        }
        id_lists.push(id_list);
    }
    let id_to_content: HashMap<String, String> =
        content_to_id.into_iter().map(|(doc, id)| (id, doc)).collect();

    let fused_ids = rrf::fuse_top_ids(&id_lists, RRF_K, FUSED_TOP_K);
    let fused_docs: Vec<String> = fused_ids
        .into_iter()
        .filter_map(|id| id_to_content.get(&id).cloned())
        .collect();

    if use_rerank {
        if let Some(reranker) = reranker {
            match reranker.rerank(query, &fused_docs, FINAL_TOP_K) {
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
    Ok(fused_docs.into_iter().take(FINAL_TOP_K).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatResponse;
    use crate::error::{RagError, Result};

    struct StubChat {
        response: Option<String>,
    }
    impl ChatBackend for StubChat {
        fn name(&self) -> &'static str {
            "stub"
        }
        fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse> {
            match &self.response {
                Some(text) => Ok(ChatResponse {
                    content: text.clone(),
                }),
                None => Err(RagError::ChatUnavailable {
                    message: "down".to_string(),
                }),
            }
        }
    }

    #[test]
    fn degrades_to_original_on_chat_failure() {
        let chat = StubChat { response: None };
        let variants = generate_variants(&chat, "m", "what is rust", 2);
        assert_eq!(variants, vec!["what is rust".to_string()]);
    }

    #[test]
    fn filters_short_and_duplicate_variants() {
        let chat = StubChat {
            response: Some("hi\nWhat Is Rust\nwhat is the rust programming language".to_string()),
        };
        let variants = generate_variants(&chat, "m", "what is rust", 2);
        assert_eq!(variants[0], "what is rust");
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[1], "what is the rust programming language");
    }
}
