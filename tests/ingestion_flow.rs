//! Ingestion pipeline behavior: chunk accounting, store lifecycle, partial
//! progress on failure, and the assistant facade end to end.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use lexsmith::config::{ChunkingConfig, RetrievalConfig};
use lexsmith::embeddings::{EmbeddingProvider, MockEmbeddingProvider};
use lexsmith::generation::MockGenerator;
use lexsmith::ingestion::{CorpusIngestor, DocumentSource};
use lexsmith::router::RoutingDecision;
use lexsmith::stores::{MemoryVectorStore, StoredChunk, VectorStore};
use lexsmith::types::{EmbeddingError, IngestError, RouterError, StoreError};
use lexsmith::LegalAssistant;

fn config(chunk_size: usize, overlap: usize) -> ChunkingConfig {
    ChunkingConfig {
        chunk_size,
        overlap,
    }
}

fn plain(text: &str) -> DocumentSource {
    DocumentSource::PlainText(text.as_bytes().to_vec())
}

#[tokio::test]
async fn thousand_char_document_yields_three_stored_chunks() {
    let store = Arc::new(MemoryVectorStore::new());
    let ingestor = CorpusIngestor::new(
        Arc::new(MockEmbeddingProvider::new()),
        Arc::clone(&store) as Arc<dyn VectorStore>,
        "ipc",
    );

    let text = "a".repeat(1000);
    let report = ingestor.ingest(&plain(&text), &config(400, 100)).await.unwrap();

    assert_eq!(report.chunks_total, 3);
    assert_eq!(report.chunks_ingested, 3);
    assert_eq!(report.source_chars, 1000);
    assert_eq!(store.count().await.unwrap(), 3);
    assert!(ingestor.exists().await.unwrap());
}

#[tokio::test]
async fn batching_respects_the_configured_limit() {
    let store = Arc::new(MemoryVectorStore::new());
    let ingestor = CorpusIngestor::new(
        Arc::new(MockEmbeddingProvider::new()),
        Arc::clone(&store) as Arc<dyn VectorStore>,
        "ipc",
    )
    .with_embed_batch_size(2);

    let text = "b".repeat(1000);
    let report = ingestor.ingest(&plain(&text), &config(400, 100)).await.unwrap();

    // Three chunks in batches of two: 2 + 1.
    assert_eq!(report.batches, 2);
    assert_eq!(report.chunks_ingested, 3);
}

#[tokio::test]
async fn reset_then_exists_is_false_and_reset_is_idempotent() {
    let store = Arc::new(MemoryVectorStore::new());
    let ingestor = CorpusIngestor::new(
        Arc::new(MockEmbeddingProvider::new()),
        Arc::clone(&store) as Arc<dyn VectorStore>,
        "ipc",
    );

    ingestor
        .ingest(&plain("some corpus text"), &config(400, 100))
        .await
        .unwrap();
    assert!(ingestor.exists().await.unwrap());

    ingestor.reset().await.unwrap();
    assert!(!ingestor.exists().await.unwrap());

    // Resetting the already-empty store is still a success.
    ingestor.reset().await.unwrap();
    assert!(!ingestor.exists().await.unwrap());
}

/// Embedder that serves a fixed number of calls, then fails.
struct FlakyEmbedder {
    inner: MockEmbeddingProvider,
    calls: AtomicUsize,
    fail_from_call: usize,
}

impl FlakyEmbedder {
    fn failing_from(fail_from_call: usize) -> Self {
        Self {
            inner: MockEmbeddingProvider::new(),
            calls: AtomicUsize::new(0),
            fail_from_call,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for FlakyEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call >= self.fail_from_call {
            return Err(EmbeddingError::Transport("upstream timeout".to_string()));
        }
        self.inner.embed_batch(texts).await
    }
}

#[tokio::test]
async fn embedding_failure_reports_partial_progress() {
    let store = Arc::new(MemoryVectorStore::new());
    // One chunk per batch; the third embedding call fails.
    let ingestor = CorpusIngestor::new(
        Arc::new(FlakyEmbedder::failing_from(2)),
        Arc::clone(&store) as Arc<dyn VectorStore>,
        "ipc",
    )
    .with_embed_batch_size(1);

    let text = "c".repeat(1000);
    let err = ingestor
        .ingest(&plain(&text), &config(400, 100))
        .await
        .unwrap_err();

    match &err {
        IngestError::Embedding { ingested, .. } => assert_eq!(*ingested, 2),
        other => panic!("expected embedding failure, got {other:?}"),
    }
    assert_eq!(err.chunks_ingested(), 2);
    // Only fully upserted batches count as ingested.
    assert_eq!(store.count().await.unwrap(), 2);
}

/// Store that accepts a fixed number of upserts, then fails writes.
struct FlakyStore {
    inner: MemoryVectorStore,
    writes: AtomicUsize,
    fail_from_write: usize,
}

impl FlakyStore {
    fn failing_from(fail_from_write: usize) -> Self {
        Self {
            inner: MemoryVectorStore::new(),
            writes: AtomicUsize::new(0),
            fail_from_write,
        }
    }
}

#[async_trait]
impl VectorStore for FlakyStore {
    async fn upsert(&self, chunks: Vec<StoredChunk>) -> Result<(), StoreError> {
        let write = self.writes.fetch_add(1, Ordering::SeqCst);
        if write >= self.fail_from_write {
            return Err(StoreError::Write("disk full".to_string()));
        }
        self.inner.upsert(chunks).await
    }

    async fn query(
        &self,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<lexsmith::stores::ScoredChunk>, StoreError> {
        self.inner.query(embedding, top_k).await
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.inner.delete_all().await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.inner.count().await
    }
}

#[tokio::test]
async fn store_write_failure_reports_partial_progress() {
    let ingestor = CorpusIngestor::new(
        Arc::new(MockEmbeddingProvider::new()),
        Arc::new(FlakyStore::failing_from(1)),
        "ipc",
    )
    .with_embed_batch_size(1);

    let text = "d".repeat(1000);
    let err = ingestor
        .ingest(&plain(&text), &config(400, 100))
        .await
        .unwrap_err();

    match err {
        IngestError::StoreWrite { ingested, .. } => assert_eq!(ingested, 1),
        other => panic!("expected store write failure, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_chunking_config_fails_before_any_work() {
    let store = Arc::new(MemoryVectorStore::new());
    let ingestor = CorpusIngestor::new(
        Arc::new(MockEmbeddingProvider::new()),
        Arc::clone(&store) as Arc<dyn VectorStore>,
        "ipc",
    );

    let err = ingestor
        .ingest(&plain("text"), &config(100, 100))
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::Config(_)));
    assert_eq!(err.chunks_ingested(), 0);
    assert_eq!(store.count().await.unwrap(), 0);
}

fn assistant_over(store: Arc<MemoryVectorStore>, generator: Arc<MockGenerator>) -> LegalAssistant {
    LegalAssistant::builder()
        .embedder(Arc::new(MockEmbeddingProvider::new()))
        .store(store)
        .generator(generator)
        .namespace("ipc")
        .chunking(ChunkingConfig {
            chunk_size: 400,
            overlap: 100,
        })
        .retrieval(RetrievalConfig {
            top_k: 3,
            relevance_threshold: 0.75,
        })
        .build()
        .unwrap()
}

#[tokio::test]
async fn assistant_grounds_a_question_matching_the_corpus() {
    let generator = Arc::new(MockGenerator::with_reply(
        "Article 14 guarantees equality before law [ipc-00000].",
    ));
    let assistant = assistant_over(Arc::new(MemoryVectorStore::new()), Arc::clone(&generator));

    // A single-window corpus; asking with the exact text embeds to the same
    // vector, so the top score is 1.0 and the answer must be grounded.
    let corpus = "Article 14. The State shall not deny to any person equality before the law.";
    assistant.ingest(&plain(corpus)).await.unwrap();
    assert!(assistant.exists().await.unwrap());
    assistant.init().await.unwrap();

    let answer = assistant.answer(corpus).await.unwrap();
    assert_eq!(answer.path, RoutingDecision::Grounded);
    assert_eq!(answer.cited_chunk_ids, vec!["ipc-00000"]);
    assert!(generator.prompts()[0].contains("equality before the law"));
}

#[tokio::test]
async fn assistant_answers_direct_when_the_store_is_empty() {
    let generator = Arc::new(MockGenerator::with_reply("From general knowledge."));
    let assistant = assistant_over(Arc::new(MemoryVectorStore::new()), Arc::clone(&generator));
    assistant.init().await.unwrap();

    let answer = assistant.answer("What is Article 14?").await.unwrap();
    assert_eq!(answer.path, RoutingDecision::Direct);
    assert!(answer.cited_chunk_ids.is_empty());
}

#[tokio::test]
async fn resetting_the_assistant_tears_the_router_down() {
    let generator = Arc::new(MockGenerator::with_reply("answer"));
    let assistant = assistant_over(Arc::new(MemoryVectorStore::new()), Arc::clone(&generator));

    assistant.ingest(&plain("corpus body")).await.unwrap();
    assistant.init().await.unwrap();
    assert!(assistant.is_ready());

    assistant.reset().await.unwrap();
    assert!(!assistant.is_ready());
    assert!(!assistant.exists().await.unwrap());
    let err = assistant.answer("q").await.unwrap_err();
    assert!(matches!(err, RouterError::NotInitialized));
}
