//! Language-model service client.
//!
//! Single-turn chat completions over authenticated HTTPS. Generation parameters are
//! fixed; no prior turns are replayed, so every request stands alone apart from the
//! retrieval context embedded in the system message.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 1000;

/// Errors raised while calling the language-model service.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport-level failure while calling the service.
    #[error("language-model request failed: {0}")]
    Request(String),
    /// Service answered with a non-success status.
    #[error("language-model service returned status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code from the service.
        status: StatusCode,
        /// Response body captured for diagnostics.
        body: String,
    },
    /// Response parsed but carried no choices.
    #[error("language-model response contained no choices")]
    MalformedResponse,
}

/// Client for an OpenRouter-style chat-completions endpoint.
pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl LlmClient {
    /// Construct a client for the service at `base_url` using a startup-resolved key.
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Send one system + user message pair and return the generated text.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("X-Title", "deskbot")
            .json(&body)
            .send()
            .await
            .map_err(|err| LlmError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::UnexpectedStatus { status, body });
        }

        let payload: ChatCompletion = response
            .json()
            .await
            .map_err(|err| LlmError::Request(err.to_string()))?;

        payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(LlmError::MalformedResponse)
    }
}
