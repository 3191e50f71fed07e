//! # Text Embeddings
//!
//! This crate defines the embedding service interface used by the RAG path,
//! plus an HTTP implementation for OpenAI-compatible `/embeddings`
//! endpoints.

use async_trait::async_trait;

mod http;
pub use http::HttpEmbeddingClient;

/// Service for generating text embeddings.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Generates an embedding vector for a single text string.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error>;
}
