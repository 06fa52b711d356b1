//! Backend facade shared by every HTTP handler.
//!
//! [`BackendApi`] is the seam between the router and the rest of the crate. Handlers
//! only see the trait, so router tests substitute a stub service and never touch the
//! network or the database.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::chat::{LlmClient, Responder};
use crate::config::Config;
use crate::embedding::{Embedder, HttpEmbedder};
use crate::index::VectorIndex;
use crate::ingest::{IngestError, IngestPipeline, IngestReport, Source};
use crate::ledger::{
    ChatLogRow, DashboardStats, KnowledgeItem, Ledger, LedgerError, Origin, SessionRow,
};

/// Operations the HTTP surface needs from the backend.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Answer a chat message with display-ready HTML.
    async fn respond(&self, message: &str, session_id: &str) -> String;

    /// Run one source through the ingestion pipeline.
    async fn ingest(
        &self,
        source: Source,
        origin: Origin,
        session_id: Option<&str>,
    ) -> Result<IngestReport, IngestError>;

    /// Aggregate counters for the dashboard.
    async fn stats(&self) -> Result<DashboardStats, LedgerError>;

    /// All knowledge items, newest first.
    async fn knowledge_items(&self) -> Result<Vec<KnowledgeItem>, LedgerError>;

    /// All chat sessions, most recently active first.
    async fn sessions(&self) -> Result<Vec<SessionRow>, LedgerError>;

    /// The most recent chat turns, newest first.
    async fn recent_chats(&self, limit: i64) -> Result<Vec<ChatLogRow>, LedgerError>;

    /// Mark a session as ended.
    async fn end_session(&self, session_id: &str) -> Result<(), LedgerError>;
}

/// Concrete backend wiring the pipeline, responder, and ledger together.
pub struct AppService {
    pipeline: IngestPipeline,
    responder: Responder,
    ledger: Ledger,
}

impl AppService {
    /// Build the backend from configuration: open the ledger and construct the
    /// outbound clients for the embedding service, vector index, and language model.
    pub async fn from_config(config: &Config) -> Result<Self, LedgerError> {
        let http = Client::new();
        let ledger = Ledger::connect(&config.database_path).await?;

        let embedder: Arc<dyn Embedder> = Arc::new(HttpEmbedder::new(
            http.clone(),
            config.embedding_url.clone(),
            config.embedding_model.clone(),
            config.embedding_dimension,
        ));
        let index = Arc::new(VectorIndex::new(
            http.clone(),
            config.index_url.clone(),
            config.index_api_key.clone(),
        ));
        let llm = LlmClient::new(
            http.clone(),
            config.llm_url.clone(),
            config.llm_api_key.clone(),
            config.llm_model.clone(),
        );

        let pipeline = IngestPipeline::new(
            ledger.clone(),
            Arc::clone(&embedder),
            Arc::clone(&index),
            http,
            config.chunk_window,
            config.upload_dir.clone(),
        );
        let responder = Responder::new(
            ledger.clone(),
            embedder,
            index,
            llm,
            config.retrieval_top_k,
        );

        Ok(Self {
            pipeline,
            responder,
            ledger,
        })
    }
}

#[async_trait]
impl BackendApi for AppService {
    async fn respond(&self, message: &str, session_id: &str) -> String {
        self.responder.respond(message, session_id).await
    }

    async fn ingest(
        &self,
        source: Source,
        origin: Origin,
        session_id: Option<&str>,
    ) -> Result<IngestReport, IngestError> {
        self.pipeline.ingest(source, origin, session_id).await
    }

    async fn stats(&self) -> Result<DashboardStats, LedgerError> {
        self.ledger.stats().await
    }

    async fn knowledge_items(&self) -> Result<Vec<KnowledgeItem>, LedgerError> {
        self.ledger.knowledge_items().await
    }

    async fn sessions(&self) -> Result<Vec<SessionRow>, LedgerError> {
        self.ledger.sessions().await
    }

    async fn recent_chats(&self, limit: i64) -> Result<Vec<ChatLogRow>, LedgerError> {
        self.ledger.recent_chats(limit).await
    }

    async fn end_session(&self, session_id: &str) -> Result<(), LedgerError> {
        self.ledger.end_session(session_id).await
    }
}
