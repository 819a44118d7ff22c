//! URL fetching with Jina Reader proxy preference (`spec.md` §4.F).

use regex::Regex;

use crate::config::{WEB_FETCH_MAX_CHARS, WEB_TIMEOUT};
use crate::error::{RagError, Result};

/// Trait for fetching and extracting a URL's textual body.
pub trait UrlFetcher: Send + Sync {
    /// Fetches `url` and returns its extracted text, truncated to
    /// [`WEB_FETCH_MAX_CHARS`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::FetchError`] if every fetch strategy fails.
    fn fetch(&self, url: &str, use_jina: bool) -> Result<String>;
}

/// Fetches pages directly, preferring the Jina Reader proxy
/// (`https://r.jina.ai/<url>`) when `use_jina` is set and its stripped
/// body exceeds 100 characters; otherwise falls back to a direct fetch
/// with best-effort HTML extraction.
#[derive(Debug, Clone)]
pub struct HttpUrlFetcher {
    client: reqwest::blocking::Client,
}

impl HttpUrlFetcher {
    /// Builds a new fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }

    fn fetch_jina(&self, url: &str) -> Result<String> {
        let jina_url = format!("https://r.jina.ai/{url}");
        let resp = self
            .client
            .get(&jina_url)
            .timeout(WEB_TIMEOUT)
            .send()
            .map_err(|e| RagError::FetchError {
                message: format!("jina fetch of {url} failed: {e}"),
            })?;
        let body = resp.text().map_err(|e| RagError::FetchError {
            message: format!("jina response body for {url} unreadable: {e}"),
        })?;
        Ok(body.trim().to_string())
    }

    fn fetch_direct(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .timeout(WEB_TIMEOUT)
            .send()
            .map_err(|e| RagError::FetchError {
                message: format!("direct fetch of {url} failed: {e}"),
            })?;
        let html = resp.text().map_err(|e| RagError::FetchError {
            message: format!("response body for {url} unreadable: {e}"),
        })?;
        Ok(extract_text_from_html(&html))
    }
}

impl Default for HttpUrlFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlFetcher for HttpUrlFetcher {
    fn fetch(&self, url: &str, use_jina: bool) -> Result<String> {
        let body = if use_jina {
            match self.fetch_jina(url) {
                Ok(body) if body.chars().count() > 100 => body,
                _ => self.fetch_direct(url)?,
            }
        } else {
            self.fetch_direct(url)?
        };
        Ok(truncate_chars(&body, WEB_FETCH_MAX_CHARS))
    }
}

/// Best-effort HTML-to-text extraction: strips `<script>`/`<style>` blocks,
/// then all remaining tags, then collapses whitespace.
#[must_use]
pub fn extract_text_from_html(html: &str) -> String {
    let without_scripts = strip_blocks(html, "script");
    let without_styles = strip_blocks(&without_scripts, "style");
    let Ok(tag_pattern) = Regex::new(r"<[^>]+>") else {
        return without_styles;
    };
    let without_tags = tag_pattern.replace_all(&without_styles, " ");
    let Ok(whitespace_pattern) = Regex::new(r"\s+") else {
        return without_tags.to_string();
    };
    whitespace_pattern
        .replace_all(&without_tags, " ")
        .trim()
        .to_string()
}

fn strip_blocks(html: &str, tag: &str) -> String {
    let pattern_str = format!(r"(?is)<{tag}[^>]*>.*?</{tag}>");
    match Regex::new(&pattern_str) {
        Ok(pattern) => pattern.replace_all(html, " ").to_string(),
        Err(_) => html.to_string(),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_text_and_strips_scripts_and_styles() {
        let html = "<html><head><style>.a{color:red}</style></head><body>\
            <script>alert(1)</script><p>Hello <b>World</b></p></body></html>";
        let text = extract_text_from_html(html);
        assert_eq!(text, "Hello World");
    }

    #[test]
    fn collapses_whitespace() {
        let html = "<p>one</p>\n\n<p>two</p>";
        assert_eq!(extract_text_from_html(html), "one two");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "é".repeat(10);
        assert_eq!(truncate_chars(&text, 3).chars().count(), 3);
    }
}
