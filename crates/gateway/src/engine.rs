//! Per-frame conversation orchestration: decode → window → prompt → LLM →
//! memorize → segment → synthesize → reply.
//!
//! Failures inside one frame never tear down the connection: a bad envelope
//! or a failed chat completion ends as a logged drop of that frame, and the
//! next frame proceeds normally.

use std::sync::Arc;

use anyhow::Result;
use embedding::EmbeddingService;
use llm_client::LlmClient;
use memory_vector::VectorMemoryStore;
use prompt::ChatMessage;
use segmenter::{ResponseSegmenter, Segment};
use session::{ConversationWindow, TurnRole};
use speech::SpeechSynthesizer;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::wire::{InboundMessage, OutboundMessage, SegmentsPayload};

/// How many memories are pulled into the prompt per turn.
const RAG_TOP_K: usize = 3;

/// The conversation orchestrator. One engine serves the one active
/// connection; frames arrive strictly sequentially, so the window mutex is
/// uncontended in practice.
pub struct ConversationEngine {
    config: EngineConfig,
    window: Mutex<ConversationWindow>,
    memory: VectorMemoryStore,
    llm: Arc<dyn LlmClient>,
    embedder: Arc<dyn EmbeddingService>,
    tts: SpeechSynthesizer,
    segmenter: ResponseSegmenter,
}

impl ConversationEngine {
    pub fn new(
        config: EngineConfig,
        memory: VectorMemoryStore,
        llm: Arc<dyn LlmClient>,
        embedder: Arc<dyn EmbeddingService>,
        tts: SpeechSynthesizer,
    ) -> Self {
        if config.rag_enabled {
            info!("Conversation engine initialized, RAG memory: enabled");
        } else {
            info!("Conversation engine initialized, RAG memory: disabled");
        }
        let window = Mutex::new(ConversationWindow::new(config.max_history_turns));
        Self {
            config,
            window,
            memory,
            llm,
            embedder,
            tts,
            segmenter: ResponseSegmenter::new(),
        }
    }

    /// Clears the conversation window. Invoked once per new connection's
    /// ready transition.
    pub async fn reset_session(&self) {
        self.window.lock().await.clear();
    }

    /// Processes one inbound text frame. `None` means no reply is sent for
    /// this frame (bad envelope, empty prompt, or failed completion); the
    /// connection stays open either way.
    pub async fn handle_frame(&self, text: &str) -> Option<OutboundMessage> {
        let inbound = match InboundMessage::parse(text) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "Dropping undecodable frame");
                return None;
            }
        };

        let prompt_for_ai = inbound.prompt_text();
        if prompt_for_ai.is_empty() {
            debug!("Dropping frame with empty prompt");
            return None;
        }

        let raw_reply = match self.process_input(&prompt_for_ai).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "Turn aborted, no reply for this frame");
                return None;
            }
        };

        let segments = self.render_segments(&raw_reply).await;
        let payload = SegmentsPayload { segments };
        Some(if inbound.is_command() {
            OutboundMessage::Narration(payload)
        } else {
            OutboundMessage::AiResponse(payload)
        })
    }

    /// One turn against the model: append the user turn, assemble the
    /// prompt, complete, append the assistant turn, and (when RAG is on)
    /// store a summary of the exchange.
    async fn process_input(&self, user_input: &str) -> Result<String> {
        let history = {
            let mut window = self.window.lock().await;
            window.add_message(TurnRole::User, user_input);
            window
                .history()
                .iter()
                .map(|turn| ChatMessage {
                    role: match turn.role {
                        TurnRole::User => prompt::MessageRole::User,
                        TurnRole::Assistant => prompt::MessageRole::Assistant,
                    },
                    content: turn.content.clone(),
                })
                .collect::<Vec<_>>()
        };

        let system_prompt = self.build_system_prompt(user_input).await;
        let messages = prompt::assemble(system_prompt, history);

        info!(messages = messages.len(), "Calling the chat model");
        let reply = self.llm.complete(&messages).await?;
        info!(reply_len = reply.len(), "Chat model returned");

        self.window
            .lock()
            .await
            .add_message(TurnRole::Assistant, reply.as_str());

        if self.config.rag_enabled {
            self.memorize(user_input, &reply).await;
        }

        Ok(reply)
    }

    /// Loads the system template and, on the RAG path, substitutes the
    /// retrieved-memory section into its placeholder. With RAG disabled the
    /// template is used as-is, leftover placeholder included.
    async fn build_system_prompt(&self, user_input: &str) -> String {
        let template = prompt::load_system_template(&self.config.prompt_file);
        if !self.config.rag_enabled {
            return template;
        }

        let query_embedding = self.embed_or_zero(user_input).await;
        let memories = self.memory.retrieve_top_k(&query_embedding, RAG_TOP_K).await;
        let memory_section = prompt::render_memory_section(&memories);
        prompt::apply_memory_section(&template, &memory_section)
    }

    /// Embeds `text`, degrading any failure to a zero-filled vector of the
    /// configured dimensionality so retrieval and storage proceed with a
    /// neutral, maximally-dissimilar vector.
    async fn embed_or_zero(&self, text: &str) -> Vec<f32> {
        match self.embedder.embed(text).await {
            Ok(embedding) => embedding,
            Err(e) => {
                error!(error = %e, "Embedding failed, falling back to a zero vector");
                vec![0.0; self.config.embedding_dimension]
            }
        }
    }

    /// Stores a one-line summary of the exchange. The reply side uses the
    /// spoken text of the first structured segment so stage markup stays out
    /// of the memory.
    async fn memorize(&self, user_input: &str, raw_reply: &str) {
        let spoken = self.segmenter.first_spoken_text(raw_reply);
        let summary = format!("玩家说：'{}'，我的回应是：'{}'", user_input, spoken);
        let embedding = self.embed_or_zero(&summary).await;
        self.memory.add_memory(summary, embedding).await;
    }

    /// Segments the raw reply and synthesizes audio for each structured
    /// segment. The fallback segment has no Japanese text, so it naturally
    /// gets an empty audio reference.
    async fn render_segments(&self, raw_reply: &str) -> Vec<Segment> {
        let mut segments = self.segmenter.segment(raw_reply);
        for segment in &mut segments {
            segment.audio_url = self.tts.synthesize(&segment.text_jp).await;
        }
        segments
    }
}
