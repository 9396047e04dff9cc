//! Vector-store contract and backends.
//!
//! A unified [`VectorStore`] trait abstracts over storage implementations so
//! the ingestor and router are never tied to a specific database.
//!
//! ```text
//!                  ┌──────────────────┐
//!                  │ VectorStore trait│
//!                  │   (async CRUD)   │
//!                  └────────┬─────────┘
//!                           │
//!               ┌───────────┴───────────┐
//!               ▼                       ▼
//!        ┌─────────────┐         ┌─────────────┐
//!        │   SQLite    │         │  In-memory  │
//!        │ sqlite-vec  │         │ cosine scan │
//!        └─────────────┘         └─────────────┘
//! ```
//!
//! Scores returned by `query` are similarities in `[0, 1]`, descending.
//! Negative cosine similarity carries no ranking value for this corpus and
//! is clamped to the contract range.

pub mod sqlite;

pub use self::sqlite::SqliteVectorStore;

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::types::StoreError;

/// A chunk as persisted in a vector store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Stable, position-derived chunk id.
    pub id: String,
    /// The chunk text.
    pub text: String,
    /// Offset of the chunk within the source document, in window units.
    pub source_offset: usize,
    /// Free-form string metadata.
    pub metadata: BTreeMap<String, String>,
    /// The embedding vector.
    pub embedding: Vec<f32>,
}

/// A retrieval hit: chunk id and text plus its similarity score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub id: String,
    pub text: String,
    /// Similarity in `[0, 1]`.
    pub score: f32,
}

/// Unified contract for vector-store backends.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Inserts or replaces the given chunks.
    async fn upsert(&self, chunks: Vec<StoredChunk>) -> Result<(), StoreError>;

    /// Returns up to `top_k` chunks ordered by descending similarity to the
    /// query embedding. May return fewer, including none.
    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>, StoreError>;

    /// Removes every chunk. Idempotent: deleting from an empty store is a
    /// no-op success.
    async fn delete_all(&self) -> Result<(), StoreError>;

    /// Total number of stored chunks.
    async fn count(&self) -> Result<usize, StoreError>;

    /// Whether the store already holds content.
    async fn exists(&self) -> Result<bool, StoreError> {
        Ok(self.count().await? > 0)
    }
}

/// Cosine similarity of two vectors; 0.0 for mismatched or zero-norm input.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// In-memory backend: a brute-force cosine scan over stored chunks.
///
/// Intended for tests and small corpora; everything lives behind one lock
/// and vanishes with the process.
#[derive(Debug, Default)]
pub struct MemoryVectorStore {
    rows: RwLock<BTreeMap<String, StoredChunk>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, chunks: Vec<StoredChunk>) -> Result<(), StoreError> {
        let mut rows = self.rows.write();
        for chunk in chunks {
            rows.insert(chunk.id.clone(), chunk);
        }
        Ok(())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>, StoreError> {
        let rows = self.rows.read();
        let mut scored: Vec<ScoredChunk> = rows
            .values()
            .map(|chunk| ScoredChunk {
                id: chunk.id.clone(),
                text: chunk.text.clone(),
                score: cosine_similarity(embedding, &chunk.embedding).clamp(0.0, 1.0),
            })
            .collect();
        // Descending score; id as a deterministic tie-breaker.
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.rows.write().clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.rows.read().len())
    }
}
