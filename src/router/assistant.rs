//! Application facade tying ingestion and routing together.

use std::sync::Arc;

use crate::config::{ChunkingConfig, RetrievalConfig};
use crate::embeddings::EmbeddingProvider;
use crate::generation::Generator;
use crate::ingestion::{CorpusIngestor, DocumentSource, IngestReport};
use crate::stores::VectorStore;
use crate::types::{ConfigError, IngestError, RouterError, StoreError};

use super::{Answer, RetrievalRouter};

/// The surface the surrounding application (e.g. a chat UI) talks to:
/// `ingest`, `reset`, `exists`, `is_ready`, `answer`.
///
/// Owns a [`CorpusIngestor`] and a [`RetrievalRouter`] over the same store,
/// and keeps their lifecycles consistent: resetting the store tears the
/// router down, since the deleted content is no longer valid for citation.
pub struct LegalAssistant {
    ingestor: CorpusIngestor,
    router: RetrievalRouter,
    chunking: ChunkingConfig,
    retrieval: RetrievalConfig,
}

impl LegalAssistant {
    pub fn builder() -> LegalAssistantBuilder {
        LegalAssistantBuilder::default()
    }

    /// Verifies the collaborators and makes `answer` available.
    pub async fn init(&self) -> Result<(), RouterError> {
        self.router.init().await
    }

    pub fn is_ready(&self) -> bool {
        self.router.is_ready()
    }

    /// Ingests the corpus document with the configured chunking parameters.
    pub async fn ingest(&self, document: &DocumentSource) -> Result<IngestReport, IngestError> {
        self.ingestor.ingest(document, &self.chunking).await
    }

    /// Deletes the stored corpus and tears the router down; a fresh
    /// `init` (after re-ingestion) is required before answering again.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.ingestor.reset().await?;
        self.router.teardown();
        Ok(())
    }

    /// Whether the store already holds corpus content.
    pub async fn exists(&self) -> Result<bool, StoreError> {
        self.ingestor.exists().await
    }

    /// Answers a question with the configured top-K and relevance threshold.
    pub async fn answer(&self, question: &str) -> Result<Answer, RouterError> {
        self.router
            .answer(
                question,
                self.retrieval.top_k,
                self.retrieval.relevance_threshold,
            )
            .await
    }
}

/// Builder for [`LegalAssistant`]; collaborators are required, configuration
/// defaults to the deployed system's values.
#[derive(Default)]
pub struct LegalAssistantBuilder {
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn VectorStore>>,
    generator: Option<Arc<dyn Generator>>,
    namespace: Option<String>,
    chunking: Option<ChunkingConfig>,
    retrieval: Option<RetrievalConfig>,
}

impl LegalAssistantBuilder {
    #[must_use]
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    #[must_use]
    pub fn store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use]
    pub fn chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = Some(chunking);
        self
    }

    #[must_use]
    pub fn retrieval(mut self, retrieval: RetrievalConfig) -> Self {
        self.retrieval = Some(retrieval);
        self
    }

    /// Validates the configuration and assembles the assistant.
    pub fn build(self) -> Result<LegalAssistant, ConfigError> {
        let embedder = self
            .embedder
            .ok_or(ConfigError::MissingCollaborator("embedder"))?;
        let store = self.store.ok_or(ConfigError::MissingCollaborator("store"))?;
        let generator = self
            .generator
            .ok_or(ConfigError::MissingCollaborator("generator"))?;

        let chunking = self.chunking.unwrap_or_default();
        chunking.validate()?;
        let retrieval = self.retrieval.unwrap_or_default();
        retrieval.validate()?;
        let namespace = self
            .namespace
            .unwrap_or_else(|| "indian-constitution-ipc".to_string());

        Ok(LegalAssistant {
            ingestor: CorpusIngestor::new(Arc::clone(&embedder), Arc::clone(&store), namespace),
            router: RetrievalRouter::new(embedder, store, generator),
            chunking,
            retrieval,
        })
    }
}
