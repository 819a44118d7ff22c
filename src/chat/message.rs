//! Provider-agnostic chat message types.
//!
//! Decouples the answer/expansion orchestrators from any one chat backend's
//! wire format — see [`crate::chat::ollama::OllamaChatBackend`] for the
//! concrete Ollama-style mapping.

use serde::{Deserialize, Serialize};

/// Role of a chat message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (the fixed Documents-only / Web-capable prompts).
    System,
    /// User input (the assembled context + question).
    User,
    /// Assistant response.
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Message content.
    pub content: String,
}

/// A chat completion request (provider-agnostic).
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Ordered conversation messages, `[system, user]` per §4.G.
    pub messages: Vec<ChatMessage>,
}

/// A chat completion response (provider-agnostic).
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Generated text content.
    pub content: String,
}

/// Creates a system message.
#[must_use]
pub fn system_message(content: impl Into<String>) -> ChatMessage {
    ChatMessage {
        role: Role::System,
        content: content.into(),
    }
}

/// Creates a user message.
#[must_use]
pub fn user_message(content: impl Into<String>) -> ChatMessage {
    ChatMessage {
        role: Role::User,
        content: content.into(),
    }
}
