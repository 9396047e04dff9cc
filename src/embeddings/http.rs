//! HTTP adapter for a hosted embedding service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use url::Url;

use super::EmbeddingProvider;
use crate::types::EmbeddingError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
}

/// Client for an embedding endpoint speaking the
/// `POST {"inputs": [...]} -> [[f32, ...], ...]` shape used by hosted
/// sentence-transformer services.
#[derive(Debug, Clone)]
pub struct HttpEmbeddingProvider {
    client: Client,
    endpoint: Url,
}

impl HttpEmbeddingProvider {
    /// Builds a provider with a default client (30 s request timeout).
    pub fn new(endpoint: Url) -> Self {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client, endpoint }
    }

    /// Builds a provider on a caller-supplied client, e.g. to set a custom
    /// timeout or proxy.
    pub fn with_client(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&EmbedRequest { inputs: texts })
            .send()
            .await
            .map_err(|err| EmbeddingError::Transport(err.to_string()))?
            .error_for_status()
            .map_err(|err| EmbeddingError::Transport(err.to_string()))?;

        let vectors: Vec<Vec<f32>> = response
            .json()
            .await
            .map_err(|err| EmbeddingError::Transport(err.to_string()))?;

        if vectors.len() != texts.len() {
            return Err(EmbeddingError::LengthMismatch {
                want: texts.len(),
                got: vectors.len(),
            });
        }
        Ok(vectors)
    }
}
