//! # LLM client abstraction
//!
//! Defines the [`LlmClient`] trait and an HTTP implementation for
//! OpenAI-compatible chat-completions endpoints. Transport-agnostic; the
//! gateway engine holds it as a trait object so tests can substitute a
//! recording mock.

use anyhow::Result;
use async_trait::async_trait;
use prompt::ChatMessage;

mod http_llm;

pub use http_llm::HttpLlmClient;

/// LLM client interface: request a completion from a list of messages.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the model reply text for the given messages
    /// (system/user/assistant).
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}
