//! companion CLI: run the WebSocket backend or inspect stored memories.
//! Config comes from the sectioned settings file (default `.env`, with a
//! home-directory fallback).

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use embedding::{EmbeddingService, HttpEmbeddingClient};
use gateway::{run_server, ConversationEngine, EngineConfig};
use llm_client::{HttpLlmClient, LlmClient};
use memory_vector::VectorMemoryStore;
use settings::Settings;
use speech::SpeechSynthesizer;
use tracing::info;

#[derive(Parser)]
#[command(name = "companion")]
#[command(about = "AI companion backend: run, list-memories", long_about = None)]
#[command(version)]
struct Cli {
    /// Path of the settings file.
    #[arg(short, long, default_value = ".env")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the WebSocket server (blocks until ctrl-c, then saves memories).
    Run,
    /// List the most recent N stored memories.
    ListMemories {
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = Settings::load(&cli.config)?;

    match cli.command {
        Commands::Run => handle_run(settings).await,
        Commands::ListMemories { limit } => handle_list_memories(settings, limit).await,
    }
}

/// Starts the server: validate credentials first (fast-fail before the
/// transport binds), then wire the store, upstream clients, and engine
/// together.
async fn handle_run(settings: Settings) -> Result<()> {
    let log_file = settings.get("Logging", "LOG_FILE", "logs/companion.log");
    companion_core::init_tracing(&log_file).context("Initialize tracing")?;

    if let Some(path) = settings.loaded_path() {
        info!(path = %path.display(), "Configuration loaded");
    }

    let config = EngineConfig::from_settings(&settings);
    config.validate()?;

    let store = VectorMemoryStore::load(&config.memory_file)
        .await
        .context("Load the memory store")?;

    let llm: Arc<dyn LlmClient> = Arc::new(HttpLlmClient::new(
        config.llm_api_key.clone(),
        config.llm_base_url.clone(),
        config.llm_model.clone(),
        config.temperature,
    ));
    let embedder: Arc<dyn EmbeddingService> = Arc::new(HttpEmbeddingClient::new(
        config.embedding_api_key.clone(),
        config.embedding_model.clone(),
        config.embedding_api_url.clone(),
    ));
    let tts = SpeechSynthesizer::new(config.voice_api_url.clone());

    let engine = Arc::new(ConversationEngine::new(
        config,
        store.clone(),
        llm,
        embedder,
        tts,
    ));

    run_server(&settings, engine, store).await?;
    info!("Server shut down cleanly");
    Ok(())
}

/// Prints the newest `limit` stored memories, newest first.
async fn handle_list_memories(settings: Settings, limit: usize) -> Result<()> {
    let config = EngineConfig::from_settings(&settings);
    let store = VectorMemoryStore::load(&config.memory_file)
        .await
        .context("Load the memory store")?;

    let entries = store.entries().await;
    if entries.is_empty() {
        println!("No memories stored (file: {}).", config.memory_file);
        return Ok(());
    }

    const SUMMARY_PREVIEW_LEN: usize = 80;
    let shown = entries.iter().rev().take(limit);
    println!(
        "Newest {} of {} memories (file: {}):\n",
        limit.min(entries.len()),
        entries.len(),
        config.memory_file
    );
    println!("{:<6} {:<10} {}", "#", "dimension", "summary");
    println!("{}", "-".repeat(100));

    for (i, entry) in shown.enumerate() {
        let preview: String = entry.summary.chars().take(SUMMARY_PREVIEW_LEN).collect();
        println!("{:<6} {:<10} {}", i + 1, entry.embedding.len(), preview);
    }

    Ok(())
}
