//! Web search provider contract and DuckDuckGo HTML reference backend.

use serde::Deserialize;

use crate::config::WEB_TIMEOUT;
use crate::error::{RagError, Result};

/// One web search hit.
#[derive(Debug, Clone)]
pub struct WebSearchResult {
    /// Result URL.
    pub url: String,
    /// Result title.
    pub title: String,
    /// Short snippet body, used when the full page is not fetched.
    pub snippet: String,
}

/// Trait for web search backends (`spec.md` §4.F step 2).
pub trait WebSearchProvider: Send + Sync {
    /// Returns up to `max` results for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::WebSearchError`] on failure.
    fn search(&self, query: &str, max: usize) -> Result<Vec<WebSearchResult>>;
}

/// Queries the DuckDuckGo HTML endpoint, which requires no API key.
#[derive(Debug, Clone)]
pub struct DuckDuckGoSearchProvider {
    client: reqwest::blocking::Client,
}

impl DuckDuckGoSearchProvider {
    /// Builds a new provider.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for DuckDuckGoSearchProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct ApiResult {
    #[serde(rename = "FirstURL")]
    first_url: Option<String>,
    #[serde(rename = "Text")]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(rename = "RelatedTopics")]
    related_topics: Vec<ApiResult>,
}

impl WebSearchProvider for DuckDuckGoSearchProvider {
    fn search(&self, query: &str, max: usize) -> Result<Vec<WebSearchResult>> {
        let resp = self
            .client
            .get("https://api.duckduckgo.com/")
            .query(&[("q", query), ("format", "json"), ("no_html", "1")])
            .timeout(WEB_TIMEOUT)
            .send()
            .map_err(|e| RagError::WebSearchError {
                message: format!("duckduckgo request failed: {e}"),
            })?;

        if !resp.status().is_success() {
            return Err(RagError::WebSearchError {
                message: format!("duckduckgo returned status {}", resp.status()),
            });
        }

        let body: ApiResponse = resp.json().map_err(|e| RagError::WebSearchError {
            message: format!("invalid duckduckgo response: {e}"),
        })?;

        Ok(body
            .related_topics
            .into_iter()
            .filter_map(|r| {
                let url = r.first_url?;
                let text = r.text.unwrap_or_default();
                let title = text.split(" - ").next().unwrap_or(&text).to_string();
                Some(WebSearchResult {
                    url,
                    title,
                    snippet: text,
                })
            })
            .take(max)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_constructs_without_panicking() {
        let _provider = DuckDuckGoSearchProvider::default();
    }
}
