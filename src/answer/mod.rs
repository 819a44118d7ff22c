//! Answer Orchestrator (`spec.md` §4.G): prompt assembly, chat call,
//! citation extraction, and result caching.

pub mod citations;
pub mod prompts;

pub use citations::parse_citations;

use crate::cache::ResultCache;
use crate::chat::{ChatBackend, ChatRequest, system_message, user_message};
use crate::config::CACHE_TTL;
use crate::error::Result;

/// Input context for one answer request.
pub struct AnswerRequest<'a> {
    /// The user's question.
    pub query: &'a str,
    /// Retrieved document context, if any.
    pub document_context: Option<&'a str>,
    /// Assembled web context, if any.
    pub web_context: Option<&'a str>,
}

/// The assembled answer and its extracted citations.
#[derive(Debug, Clone)]
pub struct AnswerResult {
    /// Model-generated answer text.
    pub answer: String,
    /// Citations extracted from the answer, in pass/appearance order.
    pub citations: Vec<String>,
    /// Whether this result was served from cache.
    pub cached: bool,
}

/// Runs the answer orchestrator: checks `cache` under `cache_key`, and on a
/// miss assembles the prompt, calls `chat`, extracts citations, and
/// populates the cache (`spec.md` §4.G).
pub fn answer(
    chat: &dyn ChatBackend,
    chat_model: &str,
    cache: &dyn ResultCache,
    cache_key: &str,
    request: &AnswerRequest<'_>,
) -> Result<AnswerResult> {
    if let Some(cached) = cache.get(cache_key) {
        let citations = parse_citations(&cached);
        return Ok(AnswerResult {
            answer: cached,
            citations,
            cached: true,
        });
    }

    let mut segments = Vec::new();
    if let Some(docs) = request.document_context {
        if !docs.is_empty() {
            segments.push(format!("Documents:\n{docs}"));
        }
    }
    let has_web = request
        .web_context
        .is_some_and(|web| !web.is_empty());
    if let Some(web) = request.web_context {
        if !web.is_empty() {
            segments.push(format!("Web search results:\n{web}"));
        }
    }
    let full_context = segments.join("\n\n---\n\n");

    let system_prompt = if has_web {
        prompts::WEB_CAPABLE_PROMPT
    } else {
        prompts::DOCUMENTS_ONLY_PROMPT
    };
    let user_content = format!(
        "Context:\n---\n{}\n---\n\nQuestion: {}",
        full_context, request.query
    );

    let chat_request = ChatRequest {
        model: chat_model.to_string(),
        messages: vec![system_message(system_prompt), user_message(user_content)],
    };
    let response = chat.chat(&chat_request)?;
    let citations = parse_citations(&response.content);

    cache.set(cache_key, &response.content, CACHE_TTL);

    Ok(AnswerResult {
        answer: response.content,
        citations,
        cached: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InProcessCache;
    use crate::chat::ChatResponse;

    struct StubChat {
        reply: String,
    }
    impl ChatBackend for StubChat {
        fn name(&self) -> &'static str {
            "stub"
        }
        fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse> {
            Ok(ChatResponse {
                content: self.reply.clone(),
            })
        }
    }

    #[test]
    fn cache_hit_skips_chat_call_and_reparses_citations() {
        let cache = InProcessCache::new();
        cache.set("k", "answer with [1]", CACHE_TTL);
        let chat = StubChat {
            reply: "unused".to_string(),
        };
        let result = answer(
            &chat,
            "m",
            &cache,
            "k",
            &AnswerRequest {
                query: "q",
                document_context: None,
                web_context: None,
            },
        )
        .unwrap_or_else(|_| unreachable!());
        assert!(result.cached);
        assert_eq!(result.citations, vec!["1".to_string()]);
    }

    #[test]
    fn cache_miss_calls_chat_and_populates_cache() {
        let cache = InProcessCache::new();
        let chat = StubChat {
            reply: "The answer is [file: a.md]".to_string(),
        };
        let result = answer(
            &chat,
            "m",
            &cache,
            "k",
            &AnswerRequest {
                query: "q",
                document_context: Some("doc text"),
                web_context: None,
            },
        )
        .unwrap_or_else(|_| unreachable!());
        assert!(!result.cached);
        assert_eq!(result.citations, vec!["file:a.md".to_string()]);
        assert!(cache.get("k").is_some());
    }
}
