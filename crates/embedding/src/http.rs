//! OpenAI-compatible embedding client: `{model, input}` in,
//! `data[0].embedding` out.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::EmbeddingService;

/// Embedding client for OpenAI-compatible `/embeddings` endpoints.
#[derive(Debug, Clone)]
pub struct HttpEmbeddingClient {
    client: Client,
    api_key: String,
    model: String,
    api_url: String,
}

impl HttpEmbeddingClient {
    /// Creates a new client. `api_url` may be a bare base URL; `/embeddings`
    /// is appended when missing. Configure the full endpoint URL when the
    /// provider deviates from that path.
    pub fn new(api_key: String, model: String, api_url: String) -> Self {
        let client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            model,
            api_url: normalize_endpoint(api_url),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// Appends `/embeddings` unless the URL already contains it.
fn normalize_endpoint(mut url: String) -> String {
    if url.is_empty() || url.contains("/embeddings") {
        return url;
    }
    if !url.ends_with('/') {
        url.push('/');
    }
    url.push_str("embeddings");
    url
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

#[async_trait]
impl EmbeddingService for HttpEmbeddingClient {
    /// Sends one embedding request and returns the first vector in the
    /// response. Errors on a missing URL, a non-2xx status, a body-level
    /// `error` object, or a body with no embedding data. Callers on the RAG
    /// path degrade these errors to a zero vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.api_url.is_empty() {
            anyhow::bail!("Embedding API URL is not configured");
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Embedding API error ({}): {}",
                status,
                error_text
            ));
        }

        let embedding_response: EmbeddingResponse = response.json().await?;

        if let Some(error) = embedding_response.error {
            return Err(anyhow::anyhow!("Embedding API error: {}", error.message));
        }

        let embedding = embedding_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| anyhow::anyhow!("No embedding in response"))?;

        info!(dimension = embedding.len(), "Embedding request completed");
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_embeddings_path_when_missing() {
        assert_eq!(
            normalize_endpoint("https://api.example.com/v1".to_string()),
            "https://api.example.com/v1/embeddings"
        );
        assert_eq!(
            normalize_endpoint("https://api.example.com/v1/".to_string()),
            "https://api.example.com/v1/embeddings"
        );
    }

    #[test]
    fn keeps_url_that_already_has_embeddings_path() {
        assert_eq!(
            normalize_endpoint("https://api.example.com/v1/embeddings".to_string()),
            "https://api.example.com/v1/embeddings"
        );
    }

    #[test]
    fn empty_url_stays_empty() {
        assert_eq!(normalize_endpoint(String::new()), "");
    }
}
