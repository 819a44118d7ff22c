//! Ollama-compatible chat backend (`POST {base_url}/api/chat`).
//!
//! Reference implementation of the chat backend contract in §6: request
//! `{model, messages, stream: false}`, response `{message: {content}}`.

use serde::{Deserialize, Serialize};

use crate::chat::backend::ChatBackend;
use crate::chat::message::{ChatRequest, ChatResponse, Role};
use crate::config::CHAT_TIMEOUT;
use crate::error::{RagError, Result};

/// Chat backend talking to an Ollama-compatible server over HTTP.
#[derive(Debug, Clone)]
pub struct OllamaChatBackend {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl OllamaChatBackend {
    /// Builds a backend targeting `base_url` (e.g. `http://localhost:11434`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct WireResponse {
    message: WireResponseMessage,
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

impl ChatBackend for OllamaChatBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let wire = WireRequest {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: role_str(m.role),
                    content: &m.content,
                })
                .collect(),
            stream: false,
        };

        let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(&url)
            .json(&wire)
            .timeout(CHAT_TIMEOUT)
            .send()
            .map_err(|e| RagError::ChatUnavailable {
                message: format!("request to {url} failed: {e}"),
            })?;

        if !resp.status().is_success() {
            return Err(RagError::ChatUnavailable {
                message: format!("{url} returned status {}", resp.status()),
            });
        }

        let body: WireResponse = resp.json().map_err(|e| RagError::ChatUnavailable {
            message: format!("invalid response body from {url}: {e}"),
        })?;

        Ok(ChatResponse {
            content: body.message.content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_str_matches_ollama_wire_format() {
        assert_eq!(role_str(Role::System), "system");
        assert_eq!(role_str(Role::User), "user");
        assert_eq!(role_str(Role::Assistant), "assistant");
    }

    #[test]
    fn backend_reports_its_name() {
        let backend = OllamaChatBackend::new("http://localhost:11434");
        assert_eq!(backend.name(), "ollama");
    }
}
