//! Typed views over the settings file for the server and the engine.

use anyhow::Result;
use settings::Settings;

/// Placeholder shipped in the sample configuration; treated the same as a
/// missing key.
const API_KEY_PLACEHOLDER: &str = "your_deepseek_api_key_here";

/// Transport-level configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub document_root: String,
}

impl ServerConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        let port = settings
            .get("Server", "BACKEND_PORT", "8765")
            .parse()
            .unwrap_or(8765);
        let document_root = settings.get("Server", "DOCUMENT_ROOT", "frontend");
        Self {
            port,
            document_root,
        }
    }
}

/// Everything the conversation engine reads from configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub temperature: f32,
    pub max_history_turns: usize,
    pub rag_enabled: bool,
    pub embedding_api_key: String,
    pub embedding_model: String,
    pub embedding_api_url: String,
    pub embedding_dimension: usize,
    pub voice_api_url: String,
    pub prompt_file: String,
    pub memory_file: String,
}

impl EngineConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            llm_api_key: settings.get("API_LLM", "DEEPSEEK_API_KEY", ""),
            llm_base_url: settings.get(
                "API_LLM",
                "API_BASE_URL",
                "https://api.deepseek.com/v1",
            ),
            llm_model: settings.get("AI", "MODEL", "deepseek-chat"),
            temperature: settings
                .get("AI", "TEMPERATURE", "0.7")
                .parse()
                .unwrap_or(0.7),
            max_history_turns: settings
                .get("AI", "MAX_HISTORY_TURNS", "10")
                .parse()
                .unwrap_or(10),
            rag_enabled: settings
                .get("AI", "ENABLE_RAG", "false")
                .eq_ignore_ascii_case("true"),
            embedding_api_key: settings.get("API_EMBEDDING", "EMBEDDING_API_KEY", ""),
            embedding_model: settings.get("API_EMBEDDING", "EMBEDDING_MODEL", ""),
            embedding_api_url: settings.get("API_EMBEDDING", "EMBEDDING_API_URL", ""),
            embedding_dimension: settings
                .get("API_EMBEDDING", "EMBEDDING_VECTOR_DIMENSION", "1024")
                .parse()
                .unwrap_or(1024),
            voice_api_url: settings.get("API", "VOICE_API_URL", ""),
            prompt_file: settings.get("SystemPrompt", "PROMPT_FILE", "prompt.txt"),
            memory_file: settings.get("AI", "MEMORY_FILE", "memories.json"),
        }
    }

    /// Startup-fatal credential check: the chat API key must be present and
    /// not the sample placeholder. Runs before the transport is started.
    pub fn validate(&self) -> Result<()> {
        if self.llm_api_key.is_empty() || self.llm_api_key == API_KEY_PLACEHOLDER {
            anyhow::bail!(
                "DEEPSEEK_API_KEY is not set (or still the placeholder) in [API_LLM]. \
                 Fill in a valid key and restart."
            );
        }
        Ok(())
    }
}
