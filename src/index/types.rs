//! Wire types shared by the vector index client.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while talking to the vector index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Transport-level failure (connection, timeout, body decode).
    #[error("vector index request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Index answered with a non-success status.
    #[error("vector index returned status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code from the index.
        status: StatusCode,
        /// Response body captured for diagnostics.
        body: String,
    },
}

/// Metadata persisted with each vector and echoed back by queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMetadata {
    /// Source text of the chunk; the unit of retrieval context.
    pub text: String,
    /// Origin tag (`admin` or `user`).
    #[serde(default)]
    pub origin: String,
    /// File name or URL the chunk came from.
    #[serde(default)]
    pub source: String,
    /// Owning session for user-initiated uploads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// A single vector to upsert.
#[derive(Debug, Clone, Serialize)]
pub struct VectorRecord {
    /// Unique identifier, never reused across ingestions.
    pub id: String,
    /// Embedding values.
    pub values: Vec<f32>,
    /// Metadata stored alongside the vector.
    pub metadata: VectorMetadata,
}

/// One nearest-neighbor match returned by a query.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryMatch {
    /// Identifier of the stored vector.
    pub id: String,
    /// Cosine similarity score.
    pub score: f32,
    /// Stored metadata, present when the query asked for it.
    #[serde(default)]
    pub metadata: Option<VectorMetadata>,
}

/// Response envelope for `POST /query`.
#[derive(Deserialize)]
pub(crate) struct QueryResponse {
    pub matches: Vec<QueryMatch>,
}
