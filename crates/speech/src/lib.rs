//! # Speech
//!
//! Client for the external text-to-speech backend: `{text, speaker_id}` in,
//! `audio_url` out. Synthesis is best-effort — a blank endpoint, empty text,
//! or any upstream failure yields an empty audio reference and never aborts
//! the turn.

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Text-to-speech client.
#[derive(Debug, Clone)]
pub struct SpeechSynthesizer {
    client: Client,
    api_url: String,
    speaker_id: u32,
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    speaker_id: u32,
}

#[derive(Debug, Deserialize)]
struct SynthesisResponse {
    #[serde(default)]
    audio_url: String,
}

impl SpeechSynthesizer {
    pub fn new(api_url: String) -> Self {
        let client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_url,
            speaker_id: 0,
        }
    }

    pub fn with_speaker_id(mut self, speaker_id: u32) -> Self {
        self.speaker_id = speaker_id;
        self
    }

    /// Synthesizes `text` and returns the audio URL, or an empty string when
    /// the endpoint is unconfigured, the text is empty, or the upstream call
    /// fails.
    pub async fn synthesize(&self, text: &str) -> String {
        if self.api_url.is_empty() || text.is_empty() {
            return String::new();
        }

        match self.request(text).await {
            Ok(audio_url) => audio_url,
            Err(e) => {
                warn!(error = %e, "Speech synthesis failed, continuing without audio");
                String::new()
            }
        }
    }

    async fn request(&self, text: &str) -> Result<String> {
        let request = SynthesisRequest {
            text,
            speaker_id: self.speaker_id,
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("TTS API error ({}): {}", status, error_text));
        }

        let synthesis: SynthesisResponse = response.json().await?;
        Ok(synthesis.audio_url)
    }
}
