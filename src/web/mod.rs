//! Web-Context Builder (`spec.md` §4.F).

pub mod fetch;
pub mod search;

pub use fetch::{HttpUrlFetcher, UrlFetcher};
pub use search::{DuckDuckGoSearchProvider, WebSearchProvider, WebSearchResult};

use std::collections::HashSet;

use regex::Regex;

use crate::config::{WEB_CONTEXT_MAX_CHARS, WEB_FETCH_MAX, WEB_SNIPPET_MAX};

/// Extracts HTTP/HTTPS URLs from `text`, de-duplicated preserving first
/// occurrence, with trailing punctuation stripped (`spec.md` §4.F step 1).
#[must_use]
pub fn extract_urls(text: &str) -> Vec<String> {
    let Ok(pattern) = Regex::new(r#"https?://[^\s)\]"']+"#) else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for m in pattern.find_iter(text) {
        let cleaned = m
            .as_str()
            .trim_end_matches(['.', ',', ';', ':', '!', '?', ')'])
            .to_string();
        if seen.insert(cleaned.clone()) {
            urls.push(cleaned);
        }
    }
    urls
}

/// One fully-assembled web context entry, ready for formatting.
struct ContextEntry {
    url: String,
    title: String,
    body: String,
}

/// Builds the formatted web context block for `query`
/// (`spec.md` §4.F).
///
/// Returns an empty string if no URLs were found in the query and the
/// search provider returns nothing.
pub fn build_web_context(
    search_provider: &dyn WebSearchProvider,
    fetcher: &dyn UrlFetcher,
    query: &str,
    use_jina: bool,
) -> String {
    let mut fetched_urls: HashSet<String> = HashSet::new();
    let mut entries: Vec<ContextEntry> = Vec::new();

    for url in extract_urls(query) {
        let body = fetcher.fetch(&url, use_jina).unwrap_or_default();
        entries.push(ContextEntry {
            title: url.clone(),
            url: url.clone(),
            body,
        });
        fetched_urls.insert(url);
    }

    let results = search_provider
        .search(query, WEB_SNIPPET_MAX)
        .unwrap_or_default();
    let mut fetch_budget = WEB_FETCH_MAX;
    for result in results {
        if fetched_urls.contains(&result.url) {
            continue;
        }
        let body = if fetch_budget > 0 {
            fetch_budget -= 1;
            fetcher
                .fetch(&result.url, use_jina)
                .unwrap_or_else(|_| result.snippet.clone())
        } else {
            result.snippet.clone()
        };
        entries.push(ContextEntry {
            title: result.title,
            url: result.url.clone(),
            body,
        });
        fetched_urls.insert(result.url);
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let truncated = truncate_chars(&entry.body, WEB_CONTEXT_MAX_CHARS);
            format!(
                "[{}] [url: {}] [title: {}]\n{}",
                i + 1,
                entry.url,
                entry.title,
                truncated
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
