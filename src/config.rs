//! Operator-tunable configuration.
//!
//! Chunk window size, overlap, top-K, and the relevance threshold are plain
//! configuration values with defaults taken from the deployed system, not
//! algorithmic constants. Everything is validated before use; invalid values
//! surface as [`ConfigError`] instead of being clamped silently.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::ConfigError;

/// Default chunk window, in grapheme clusters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap shared between consecutive chunks.
pub const DEFAULT_OVERLAP: usize = 150;
/// Default number of nearest chunks fetched per question.
pub const DEFAULT_TOP_K: usize = 4;
/// Default minimum similarity for a chunk to count as grounding.
pub const DEFAULT_RELEVANCE_THRESHOLD: f32 = 0.75;

/// Sliding-window chunking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Window size in grapheme clusters. Must be greater than zero.
    pub chunk_size: usize,
    /// Graphemes shared between consecutive windows. Must be smaller than
    /// `chunk_size`; larger overlap trades storage and embedding cost for
    /// retrieval recall across clause boundaries.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ConfigError> {
        let config = Self {
            chunk_size,
            overlap,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.overlap >= self.chunk_size {
            return Err(ConfigError::OverlapTooLarge {
                overlap: self.overlap,
                chunk_size: self.chunk_size,
            });
        }
        Ok(())
    }
}

/// Retrieval and routing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Nearest neighbours fetched per question. Must be greater than zero.
    pub top_k: usize,
    /// Inclusive similarity threshold a chunk must meet to be used as
    /// grounding. Must lie within `0.0..=1.0`.
    pub relevance_threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
        }
    }
}

impl RetrievalConfig {
    pub fn new(top_k: usize, relevance_threshold: f32) -> Result<Self, ConfigError> {
        let config = Self {
            top_k,
            relevance_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::ZeroTopK);
        }
        if !(0.0..=1.0).contains(&self.relevance_threshold) {
            return Err(ConfigError::ThresholdOutOfRange(self.relevance_threshold));
        }
        Ok(())
    }
}

/// Endpoints and credentials for the collaborator services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Embedding service endpoint (`POST {"inputs": [...]}`).
    pub embedding_url: Url,
    /// Gemini API key.
    pub gemini_api_key: String,
    /// Gemini model id, e.g. `gemini-2.0-flash`.
    pub gemini_model: String,
    /// Path of the SQLite vector store file.
    pub store_path: PathBuf,
    /// Corpus namespace, used as the chunk id prefix.
    pub namespace: String,
}

impl ServiceConfig {
    /// Loads the service configuration from the environment, honouring a
    /// `.env` file when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let embedding_url = std::env::var("LEXSMITH_EMBEDDING_URL")
            .map_err(|_| ConfigError::MissingEnv("LEXSMITH_EMBEDDING_URL"))?;
        let embedding_url = Url::parse(&embedding_url)
            .map_err(|err| ConfigError::InvalidEndpoint(format!("{embedding_url}: {err}")))?;
        let gemini_api_key =
            std::env::var("GOOGLE_API_KEY").map_err(|_| ConfigError::MissingEnv("GOOGLE_API_KEY"))?;
        let gemini_model = std::env::var("LEXSMITH_GEMINI_MODEL")
            .unwrap_or_else(|_| "gemini-2.0-flash".to_string());
        let store_path = std::env::var("LEXSMITH_STORE_PATH")
            .unwrap_or_else(|_| "lexsmith.sqlite".to_string());
        let namespace = std::env::var("LEXSMITH_NAMESPACE")
            .unwrap_or_else(|_| "indian-constitution-ipc".to_string());

        Ok(Self {
            embedding_url,
            gemini_api_key,
            gemini_model,
            store_path: PathBuf::from(store_path),
            namespace,
        })
    }
}
