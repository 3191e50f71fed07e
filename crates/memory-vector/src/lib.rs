//! # Vector Memory Store
//!
//! Append-only collection of `(summary, embedding)` pairs with brute-force
//! cosine top-k retrieval. The whole store is loaded from a JSON file at
//! startup and written back once at controlled shutdown; there is no
//! incremental persistence, so memories added between the last save and an
//! uncontrolled termination are lost. That durability gap is part of the
//! contract.
//!
//! Retrieval cost is `O(n·d)` per query; no index is maintained. Store size
//! stays small (single-user, session-scale memory), so the scan is fine.
//!
//! ## Thread Safety
//!
//! Entries live behind `Arc<RwLock<...>>`; the store clones cheaply and can
//! be shared between the gateway and the shutdown path.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, info};

/// One long-term memory: a text summary and its embedding. Immutable once
/// created; persisted verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub summary: String,
    pub embedding: Vec<f32>,
}

/// File-backed vector memory store.
#[derive(Debug, Clone)]
pub struct VectorMemoryStore {
    entries: Arc<RwLock<Vec<MemoryEntry>>>,
    file_path: PathBuf,
}

impl VectorMemoryStore {
    /// Loads the store from `path`. An absent file initializes an empty
    /// store. A malformed file also initializes an empty store: its content
    /// is not recovered and the next save overwrites it.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let file_path = path.into();
        let entries = match tokio::fs::read(&file_path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<MemoryEntry>>(&bytes) {
                Ok(entries) => {
                    info!(
                        path = %file_path.display(),
                        count = entries.len(),
                        "Loaded memories from file"
                    );
                    entries
                }
                Err(e) => {
                    error!(
                        path = %file_path.display(),
                        error = %e,
                        "Memory file is malformed, starting with an empty store"
                    );
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    path = %file_path.display(),
                    "Memory file not found, starting with an empty store"
                );
                Vec::new()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Read memory file {}", file_path.display()))
            }
        };

        Ok(Self {
            entries: Arc::new(RwLock::new(entries)),
            file_path,
        })
    }

    /// Appends a memory. In-memory effect only; nothing touches the file
    /// until [`save`](Self::save).
    pub async fn add_memory(&self, summary: impl Into<String>, embedding: Vec<f32>) {
        let mut entries = self.entries.write().await;
        entries.push(MemoryEntry {
            summary: summary.into(),
            embedding,
        });
        info!(total = entries.len(), "Added a new memory");
    }

    /// Scores every stored embedding against `query` by cosine similarity
    /// and returns the summaries of the top `min(k, n)` entries, best first.
    /// Equal scores keep insertion order (stable sort), but callers must not
    /// depend on tie order.
    pub async fn retrieve_top_k(&self, query: &[f32], k: usize) -> Vec<String> {
        let entries = self.entries.read().await;
        if entries.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f32, &MemoryEntry)> = entries
            .iter()
            .map(|entry| (cosine_similarity(query, &entry.embedding), entry))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let top: Vec<String> = scored
            .into_iter()
            .take(k)
            .map(|(_, entry)| entry.summary.clone())
            .collect();

        info!(count = top.len(), "Retrieved the most relevant memories");
        top
    }

    /// Serializes the whole collection back to the same file, overwriting
    /// it. Called once, at controlled shutdown.
    pub async fn save(&self) -> Result<()> {
        let entries = self.entries.read().await;
        let json = serde_json::to_string_pretty(&*entries)?;
        tokio::fs::write(&self.file_path, json)
            .await
            .with_context(|| format!("Write memory file {}", self.file_path.display()))?;
        info!(
            path = %self.file_path.display(),
            count = entries.len(),
            "Saved memories to file"
        );
        Ok(())
    }

    /// All stored entries, oldest first. Used by the inspection CLI.
    pub async fn entries(&self) -> Vec<MemoryEntry> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Cosine similarity `dot(a,b) / (|a| * |b|)`. Defined as 0.0 when either
/// vector is empty, lengths differ, or either magnitude is zero, so a
/// dimension mismatch scores as maximally dissimilar instead of erroring.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn empty_store() -> (VectorMemoryStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memories.json");
        let store = VectorMemoryStore::load(path).await.unwrap();
        (store, dir)
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_guards_degenerate_inputs() {
        let v = vec![1.0, 2.0, 3.0];
        let empty: Vec<f32> = vec![];
        let zero = vec![0.0, 0.0, 0.0];
        let shorter = vec![1.0, 2.0];

        assert_eq!(cosine_similarity(&empty, &v), 0.0);
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
        assert_eq!(cosine_similarity(&v, &shorter), 0.0);
    }

    #[tokio::test]
    async fn load_missing_file_starts_empty() {
        let (store, _dir) = empty_store().await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn retrieve_returns_min_k_n_best_first() {
        let (store, _dir) = empty_store().await;
        store.add_memory("east", vec![0.0, 1.0, 0.0]).await;
        store.add_memory("north", vec![1.0, 0.0, 0.0]).await;
        store.add_memory("north-ish", vec![0.9, 0.1, 0.0]).await;

        let query = vec![1.0, 0.0, 0.0];

        let top = store.retrieve_top_k(&query, 2).await;
        assert_eq!(top, vec!["north".to_string(), "north-ish".to_string()]);

        // k larger than n returns all of them.
        let all = store.retrieve_top_k(&query, 10).await;
        assert_eq!(all.len(), 3);
        assert_eq!(all[2], "east");
    }

    #[tokio::test]
    async fn mismatched_dimension_entries_score_zero() {
        let (store, _dir) = empty_store().await;
        store.add_memory("short", vec![1.0, 0.0]).await;
        store.add_memory("full", vec![0.5, 0.5, 0.0]).await;

        let top = store.retrieve_top_k(&[1.0, 0.0, 0.0], 2).await;
        // The mismatched entry still appears (k=2, n=2) but ranks last.
        assert_eq!(top[0], "full");
        assert_eq!(top[1], "short");
    }

    #[tokio::test]
    async fn save_then_load_round_trips_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memories.json");

        let store = VectorMemoryStore::load(&path).await.unwrap();
        store.add_memory("first", vec![0.25, -1.5]).await;
        store.add_memory("second", vec![3.0, 0.0]).await;
        store.save().await.unwrap();

        let reloaded = VectorMemoryStore::load(&path).await.unwrap();
        let entries = reloaded.entries().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].summary, "first");
        assert_eq!(entries[0].embedding, vec![0.25, -1.5]);
        assert_eq!(entries[1].summary, "second");
        assert_eq!(entries[1].embedding, vec![3.0, 0.0]);
    }

    #[tokio::test]
    async fn load_malformed_file_starts_empty_without_failing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memories.json");
        std::fs::write(&path, "not json").unwrap();

        let store = VectorMemoryStore::load(&path).await.unwrap();
        assert!(store.is_empty().await);
    }
}
