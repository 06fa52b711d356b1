//! Retrieval and response assembly for chat requests.
//!
//! A chat request is stateless with respect to prior turns: the only grounding is
//! the retrieval context fetched per message, and the only per-session state is the
//! advisory activity counters in the ledger. Any failure past validation yields the
//! fixed apology string; the root cause goes to the log, never to the caller.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::embedding::{Embedder, EmbeddingError};
use crate::index::{IndexError, VectorIndex};
use crate::ledger::{Ledger, LedgerError, NewChatTurn};

pub mod llm;

pub use llm::{LlmClient, LlmError};

/// Fixed reply for empty or whitespace-only messages.
pub const VALIDATION_MESSAGE: &str = "Please enter a valid message.";
/// Fixed reply when anything downstream of validation fails.
pub const APOLOGY_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// Internal failure while assembling a response. Never shown to the caller.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Query embedding failed.
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    /// Vector index query failed.
    #[error(transparent)]
    Index(#[from] IndexError),
    /// Language-model call failed.
    #[error(transparent)]
    Llm(#[from] LlmError),
    /// Ledger write failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Assembles grounded responses: embed the query, retrieve context, call the model.
pub struct Responder {
    ledger: Ledger,
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
    llm: LlmClient,
    top_k: usize,
}

impl Responder {
    /// Build a responder over the shared collaborators.
    pub fn new(
        ledger: Ledger,
        embedder: Arc<dyn Embedder>,
        index: Arc<VectorIndex>,
        llm: LlmClient,
        top_k: usize,
    ) -> Self {
        Self {
            ledger,
            embedder,
            index,
            llm,
            top_k,
        }
    }

    /// Answer a chat message, returning display-ready HTML.
    ///
    /// Empty messages are rejected before any side effect. All downstream failures
    /// collapse to [`APOLOGY_MESSAGE`]; in that case no chat turn is recorded.
    pub async fn respond(&self, message: &str, session_id: &str) -> String {
        if message.trim().is_empty() {
            return VALIDATION_MESSAGE.to_string();
        }

        match self.answer(message, session_id).await {
            Ok(html) => html,
            Err(err) => {
                tracing::error!(session = session_id, error = %err, "Chat request failed");
                APOLOGY_MESSAGE.to_string()
            }
        }
    }

    async fn answer(&self, message: &str, session_id: &str) -> Result<String, ChatError> {
        let started = Instant::now();

        self.ledger.touch_session(session_id).await?;

        let vector = self.embedder.embed(message).await?;
        let matches = self.index.query(vector, self.top_k).await?;
        let context = matches
            .iter()
            .filter_map(|hit| hit.metadata.as_ref().map(|meta| meta.text.as_str()))
            .collect::<Vec<_>>()
            .join("\n");
        tracing::debug!(
            session = session_id,
            matches = matches.len(),
            context_chars = context.len(),
            "Retrieved grounding context"
        );

        let content = self.llm.complete(&system_prompt(&context), message).await?;
        let html = render_markdown(&content);

        self.ledger
            .record_chat(&NewChatTurn {
                session_id: session_id.to_string(),
                user_message: message.to_string(),
                bot_response: content,
                response_seconds: started.elapsed().as_secs_f64(),
            })
            .await?;

        Ok(html)
    }
}

/// Compose the system instruction embedding the retrieval context.
pub fn system_prompt(context: &str) -> String {
    format!(
        "You are an IT helpdesk assistant. You are helpful, knowledgeable, and professional.\n\
         \n\
         Answer support questions clearly, provide step-by-step guidance, and explain\n\
         technical concepts in plain language. If users mention adding documents, remind\n\
         them they can upload PDFs or add URLs from the chat widget to expand the\n\
         knowledge base.\n\
         \n\
         Use this context if relevant to the user's question:\n\
         {context}\n\
         \n\
         Be concise but thorough. Use Markdown formatting for better readability."
    )
}

/// Convert the model's markdown output into display HTML.
pub fn render_markdown(markdown: &str) -> String {
    let parser = pulldown_cmark::Parser::new(markdown);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}
