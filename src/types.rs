//! Error taxonomy shared across the crate.
//!
//! Collaborator adapters report [`EmbeddingError`], [`StoreError`], or
//! [`GenerationError`]; the ingestor and router wrap those into
//! [`IngestError`] and [`RouterError`] with enough context for the caller to
//! decide whether to retry, abort, or reduce batch size. The core performs
//! no retries of its own and never substitutes a default answer on failure.

use thiserror::Error;

/// Rejected configuration input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,

    #[error("overlap {overlap} must be smaller than chunk_size {chunk_size}")]
    OverlapTooLarge { overlap: usize, chunk_size: usize },

    #[error("top_k must be greater than zero")]
    ZeroTopK,

    #[error("relevance threshold {0} must lie within 0.0..=1.0")]
    ThresholdOutOfRange(f32),

    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),

    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("invalid endpoint url: {0}")]
    InvalidEndpoint(String),
}

/// Failure reported by an embedding service adapter.
#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    /// Transport, auth, or timeout failure talking to the service.
    #[error("embedding request failed: {0}")]
    Transport(String),

    /// The service broke the same-length, order-preserving contract.
    #[error("embedding service returned {got} vectors for {want} inputs")]
    LengthMismatch { want: usize, got: usize },
}

/// Failure reported by a vector store adapter.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("vector store read failed: {0}")]
    Read(String),

    #[error("vector store write failed: {0}")]
    Write(String),
}

/// Failure reported by a generator adapter.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Transport(String),

    #[error("generator rejected the request (rate limit): {0}")]
    RateLimited(String),

    #[error("generator rejected the request (authentication): {0}")]
    Auth(String),

    #[error("generator returned an empty completion")]
    EmptyCompletion,
}

/// Ingestion failure.
///
/// The `ingested` count is the number of chunks already durably stored when
/// the failure occurred, so a re-ingestion can resume rather than restart
/// blindly. Chunks embedded but not yet upserted do not count.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("embedding failed after {ingested} chunks were stored")]
    Embedding {
        ingested: usize,
        #[source]
        source: EmbeddingError,
    },

    #[error("store write failed after {ingested} chunks were stored")]
    StoreWrite {
        ingested: usize,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl IngestError {
    /// Chunks durably stored before the failure (0 for pre-flight errors).
    pub fn chunks_ingested(&self) -> usize {
        match self {
            IngestError::Embedding { ingested, .. } | IngestError::StoreWrite { ingested, .. } => {
                *ingested
            }
            IngestError::Extraction(_) | IngestError::Config(_) => 0,
        }
    }
}

/// Routing failure.
///
/// "No relevant context found" is not an error — that is the direct answer
/// path. These variants cover actual service failures and misuse.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("router has not been initialized")]
    NotInitialized,

    #[error("question embedding failed")]
    Embedding(#[source] EmbeddingError),

    #[error("vector store query failed")]
    Store(#[source] StoreError),

    #[error("generation failed")]
    Generation(#[source] GenerationError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
