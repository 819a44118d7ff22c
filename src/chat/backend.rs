//! Pluggable chat backend trait.
//!
//! Mirrors the teacher's `LlmProvider` shape but drops streaming: §9
//! "Language-model control flow" specifies synchronous request/response
//! only, failing with [`crate::error::RagError::ChatUnavailable`].

use crate::chat::message::ChatRequest;
use crate::error::Result;

/// Trait for chat completion backends.
pub trait ChatBackend: Send + Sync {
    /// Backend name, used in log events.
    fn name(&self) -> &'static str;

    /// Executes a chat completion request.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::RagError::ChatUnavailable`] on failure.
    fn chat(&self, request: &ChatRequest) -> Result<crate::chat::message::ChatResponse>;
}
