//! ```text
//! Document bytes ──► ingestion::extract ──► ingestion::chunk ──► CorpusIngestor
//!                                                                     │
//!                                          embeddings::EmbeddingProvider (batched)
//!                                                                     │
//!                                                    stores::VectorStore::upsert
//!
//! Question ──► RetrievalRouter ──► embed ──► stores::VectorStore::query
//!                                                │
//!                                     router::route (threshold rule)
//!                                       │                      │
//!                              grounded prompt          direct prompt
//!                                       └──► generation::Generator ──► Answer
//! ```
//!
//! The embedding service, vector store, and generator are collaborator
//! contracts ([`embeddings::EmbeddingProvider`], [`stores::VectorStore`],
//! [`generation::Generator`]); any backend satisfying them is
//! interchangeable. The crate ships HTTP/sqlite-vec/Gemini adapters plus
//! deterministic in-process fakes for testing.

pub mod config;
pub mod embeddings;
pub mod generation;
pub mod ingestion;
pub mod router;
pub mod stores;
pub mod types;

pub use config::{ChunkingConfig, RetrievalConfig, ServiceConfig};
pub use ingestion::{CorpusIngestor, DocumentSource, IngestReport};
pub use router::{Answer, LegalAssistant, RetrievalRouter, RoutingDecision};
pub use types::{
    ConfigError, EmbeddingError, GenerationError, IngestError, RouterError, StoreError,
};
