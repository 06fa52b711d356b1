//! HTTP client wrapper for the vector index service.

use reqwest::{Client, Method};
use serde_json::json;

use super::types::{IndexError, QueryMatch, QueryResponse, VectorRecord};

/// Lightweight HTTP client for vector upserts and nearest-neighbor queries.
pub struct VectorIndex {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl VectorIndex {
    /// Construct a client for the index at `base_url`.
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Upsert a single vector with its metadata.
    pub async fn upsert(&self, record: VectorRecord) -> Result<(), IndexError> {
        let response = self
            .request(Method::POST, "vectors/upsert")
            .json(&json!({ "vectors": [record] }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            let error = IndexError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Vector upsert failed");
            Err(error)
        }
    }

    /// Query the `top_k` nearest neighbors of `vector`, including stored metadata.
    pub async fn query(
        &self,
        vector: Vec<f32>,
        top_k: usize,
    ) -> Result<Vec<QueryMatch>, IndexError> {
        let response = self
            .request(Method::POST, "query")
            .json(&json!({
                "vector": vector,
                "topK": top_k,
                "includeMetadata": true,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = IndexError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Vector query failed");
            return Err(error);
        }

        let payload: QueryResponse = response.json().await?;
        Ok(payload.matches)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{path}", self.base_url);
        let mut request = self.client.request(method, url);
        if let Some(api_key) = &self.api_key
            && !api_key.is_empty()
        {
            request = request.header("Api-Key", api_key);
        }
        request
    }
}
