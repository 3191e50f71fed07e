//! # Prompt
//!
//! Builds the message list sent to the language model:
//!
//! - **System template**: loaded from a configured file; unreadable file
//!   degrades to an empty system prompt with a warning, never an error.
//! - **Memory section**: retrieved memory summaries rendered as a bulleted
//!   list (or a literal no-memory marker) and substituted into the
//!   `[CONVERSATION_MEMORY]` placeholder in the template.
//! - **Message list**: `[system] ++ history`, where history already ends
//!   with the current user input.
//!
//! ## External interactions
//!
//! - **AI models**: Output is sent to an OpenAI-compatible chat API.

use tracing::warn;

/// Role of a message, one-to-one with chat-completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    /// System instruction (API `role: "system"`).
    System,
    /// User message (API `role: "user"`).
    User,
    /// Assistant message (API `role: "assistant"`).
    Assistant,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A single chat message, one-to-one with one element of the API `messages`
/// array.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Placeholder token inside the system template replaced by the rendered
/// memory section.
pub const MEMORY_PLACEHOLDER: &str = "[CONVERSATION_MEMORY]";

/// Marker substituted when retrieval found nothing.
pub const NO_MEMORY_MARKER: &str = "无相关记忆。";

/// Reads the system-prompt template. Failure policy: an unreadable file
/// degrades to an empty template (warning, not an error) and the pipeline
/// continues.
pub fn load_system_template(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path, error = %e, "Failed to read system prompt template");
            String::new()
        }
    }
}

/// Renders retrieved memory summaries as a bulleted list, or the no-memory
/// marker when the list is empty.
pub fn render_memory_section(summaries: &[String]) -> String {
    if summaries.is_empty() {
        return NO_MEMORY_MARKER.to_string();
    }
    let mut out = String::new();
    for summary in summaries {
        out.push_str("- ");
        out.push_str(summary);
        out.push('\n');
    }
    out
}

/// Substitutes the rendered memory section into the first occurrence of
/// [`MEMORY_PLACEHOLDER`]. A template without the placeholder is returned
/// unchanged.
pub fn apply_memory_section(template: &str, memory_section: &str) -> String {
    template.replacen(MEMORY_PLACEHOLDER, memory_section, 1)
}

/// Final message list: the system prompt followed by the conversation
/// history (which already ends with the current user input).
pub fn assemble(system_prompt: impl Into<String>, history: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend(history);
    messages
}
