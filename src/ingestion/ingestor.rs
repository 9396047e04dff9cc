//! The corpus ingestion pipeline.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

use crate::config::ChunkingConfig;
use crate::embeddings::EmbeddingProvider;
use crate::stores::{StoredChunk, VectorStore};
use crate::types::{EmbeddingError, IngestError, StoreError};

use super::chunk::split_into_chunks;
use super::extract::{DocumentSource, extract_text};

const DEFAULT_EMBED_BATCH_SIZE: usize = 32;

/// Summary of a completed ingestion run.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub job_id: Uuid,
    /// Chunks produced by splitting the document.
    pub chunks_total: usize,
    /// Chunks embedded and durably stored (equals `chunks_total` on success).
    pub chunks_ingested: usize,
    /// Embedding batches issued.
    pub batches: usize,
    /// Extracted document length in characters.
    pub source_chars: usize,
    pub elapsed_ms: u64,
}

/// Splits documents into overlapping chunks, embeds them in batches, and
/// upserts them into the vector store.
///
/// Concurrent ingests into the same store race on upserts; callers are
/// expected to serialize ingestion (single-writer convention).
pub struct CorpusIngestor {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    namespace: String,
    embed_batch_size: usize,
}

impl CorpusIngestor {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            store,
            namespace: namespace.into(),
            embed_batch_size: DEFAULT_EMBED_BATCH_SIZE,
        }
    }

    /// Caps how many chunk texts go into one embedding request, to respect
    /// the external service's batch limit.
    #[must_use]
    pub fn with_embed_batch_size(mut self, embed_batch_size: usize) -> Self {
        self.embed_batch_size = embed_batch_size.max(1);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Ingests one document: extract, split, embed (batched), upsert.
    ///
    /// Each batch is embedded and upserted before the next is requested, so
    /// on failure the error's `ingested` count equals the number of chunks
    /// already durably stored and a retry can resume from there.
    pub async fn ingest(
        &self,
        document: &DocumentSource,
        config: &ChunkingConfig,
    ) -> Result<IngestReport, IngestError> {
        let started = Instant::now();
        config.validate()?;

        let text = extract_text(document)?;
        let chunks = split_into_chunks(&self.namespace, &text, config)?;
        let chunks_total = chunks.len();
        tracing::info!(
            namespace = %self.namespace,
            chunks = chunks_total,
            chunk_size = config.chunk_size,
            overlap = config.overlap,
            "ingesting corpus"
        );

        let mut ingested = 0usize;
        let mut batches = 0usize;
        for batch in chunks.chunks(self.embed_batch_size) {
            let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
            let vectors = self
                .embedder
                .embed_batch(&texts)
                .await
                .map_err(|source| IngestError::Embedding { ingested, source })?;
            if vectors.len() != batch.len() {
                return Err(IngestError::Embedding {
                    ingested,
                    source: EmbeddingError::LengthMismatch {
                        want: batch.len(),
                        got: vectors.len(),
                    },
                });
            }

            let rows: Vec<StoredChunk> = batch
                .iter()
                .zip(vectors)
                .map(|(chunk, embedding)| StoredChunk {
                    id: chunk.id.clone(),
                    text: chunk.text.clone(),
                    source_offset: chunk.source_offset,
                    metadata: chunk.metadata.clone(),
                    embedding,
                })
                .collect();
            self.store
                .upsert(rows)
                .await
                .map_err(|source| IngestError::StoreWrite { ingested, source })?;

            ingested += batch.len();
            batches += 1;
            tracing::debug!(batch = batches, stored = ingested, "batch upserted");
        }

        let report = IngestReport {
            job_id: Uuid::new_v4(),
            chunks_total,
            chunks_ingested: ingested,
            batches,
            source_chars: text.chars().count(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        tracing::info!(
            job_id = %report.job_id,
            chunks = report.chunks_ingested,
            elapsed_ms = report.elapsed_ms,
            "ingestion complete"
        );
        Ok(report)
    }

    /// Deletes every chunk in the store. Idempotent.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.store.delete_all().await?;
        tracing::info!(namespace = %self.namespace, "vector store reset");
        Ok(())
    }

    /// Whether the store already holds content, to avoid redundant
    /// re-ingestion.
    pub async fn exists(&self) -> Result<bool, StoreError> {
        self.store.exists().await
    }
}
