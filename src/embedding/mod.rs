use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Transport-level failure while calling the embedding service.
    #[error("embedding request failed: {0}")]
    Request(String),
    /// Embedding service answered with a non-success status.
    #[error("embedding service returned status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code from the service.
        status: reqwest::StatusCode,
        /// Response body captured for diagnostics.
        body: String,
    },
    /// Embedding service returned a well-formed payload without any vector.
    #[error("embedding service returned no vector")]
    EmptyResponse,
    /// Returned vector does not match the configured dimension.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension the deployment was configured with.
        expected: usize,
        /// Dimension of the vector actually returned.
        actual: usize,
    },
}

/// Interface implemented by embedding backends.
///
/// Kept as a trait so tests and alternative providers can stand in for the HTTP
/// client without touching the pipeline.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Produce a fixed-length embedding vector for the supplied text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// HTTP embedding client speaking the `/embeddings` wire shape.
pub struct HttpEmbedder {
    client: Client,
    base_url: String,
    model: String,
    dimension: usize,
}

impl HttpEmbedder {
    /// Construct a client for the embedding service at `base_url`.
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        dimension: usize,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            dimension,
        }
    }
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&json!({ "model": self.model, "input": text }))
            .send()
            .await
            .map_err(|err| EmbeddingError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::UnexpectedStatus { status, body });
        }

        let payload: EmbeddingResponse = response
            .json()
            .await
            .map_err(|err| EmbeddingError::Request(err.to_string()))?;
        let vector = payload
            .data
            .into_iter()
            .next()
            .map(|row| row.embedding)
            .ok_or(EmbeddingError::EmptyResponse)?;

        if vector.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }
}
