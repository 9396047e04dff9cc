//! Embedding-service contract and a deterministic in-process fake.
//!
//! The external service owns the model; this crate only consumes the
//! `embed(texts) -> vectors` contract. Responses must be same-length and
//! order-preserving — a violation is a typed [`EmbeddingError`], never a
//! silent truncation.

mod http;

pub use self::http::HttpEmbeddingProvider;

use async_trait::async_trait;

use crate::types::EmbeddingError;

/// Contract for the external embedding service.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a batch of texts, returning one vector per input in input
    /// order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embeds a single text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let texts = [text.to_owned()];
        let mut vectors = self.embed_batch(&texts).await?;
        let got = vectors.len();
        match vectors.pop() {
            Some(vector) if got == 1 => Ok(vector),
            _ => Err(EmbeddingError::LengthMismatch { want: 1, got }),
        }
    }
}

/// Deterministic embedding fake for tests and offline runs.
///
/// Vectors are derived from the input bytes alone: the same text always maps
/// to the same unit vector, and distinct texts almost always differ.
#[derive(Debug, Clone)]
pub struct MockEmbeddingProvider {
    dimension: usize,
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self { dimension: 16 }
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimension];
        for (position, byte) in text.bytes().enumerate() {
            // Position-dependent weight so anagrams do not collide.
            let weight = 1.0 + (position % 7) as f32 * 0.25;
            vector[position % self.dimension] += f32::from(byte) / 255.0 * weight;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        } else {
            vector[0] = 1.0;
        }
        vector
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}
