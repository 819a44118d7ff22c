//! Chat backend contract and reference implementation.

pub mod backend;
pub mod message;
pub mod ollama;

pub use backend::ChatBackend;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, system_message, user_message};
pub use ollama::OllamaChatBackend;
