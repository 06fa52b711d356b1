//! Pipeline orchestration: extractor, chunker, embedder, and vector index upserts,
//! bracketed by status-ledger writes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Client;
use thiserror::Error;
use uuid::Uuid;

use crate::embedding::{Embedder, EmbeddingError};
use crate::extract::{self, ExtractError};
use crate::index::{IndexError, VectorIndex, VectorMetadata, VectorRecord};
use crate::ingest::chunking::chunk_text;
use crate::ingest::types::{IngestError, IngestReport, Source};
use crate::ledger::{ItemOutcome, KnowledgeItem, Ledger, Origin, SourceKind};

/// Coordinates the full ingestion pipeline for one source at a time.
///
/// The pipeline owns long-lived handles to the embedding client, vector index,
/// ledger pool, and outbound HTTP client. Construct it once near process start and
/// share it through an `Arc`.
pub struct IngestPipeline {
    ledger: Ledger,
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
    http: Client,
    chunk_window: usize,
    upload_dir: PathBuf,
}

#[derive(Debug, Error)]
enum ChunkIndexError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error(transparent)]
    Index(#[from] IndexError),
}

impl IngestPipeline {
    /// Build a pipeline over the shared collaborators.
    pub fn new(
        ledger: Ledger,
        embedder: Arc<dyn Embedder>,
        index: Arc<VectorIndex>,
        http: Client,
        chunk_window: usize,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ledger,
            embedder,
            index,
            http,
            chunk_window,
            upload_dir: upload_dir.into(),
        }
    }

    /// Ingest one source: create the status row, extract, chunk, embed, and upsert.
    ///
    /// The knowledge item is persisted with status `processing` before extraction
    /// starts and reaches exactly one terminal status before this returns. Spooled
    /// upload files are removed on every exit path.
    pub async fn ingest(
        &self,
        source: Source,
        origin: Origin,
        session_id: Option<&str>,
    ) -> Result<IngestReport, IngestError> {
        let name = source.display_name();
        let spool = match &source {
            Source::Pdf { file_name, bytes } => Some(self.spool(file_name, bytes).await?),
            Source::Url { .. } => None,
        };
        let content_ref = match (&source, &spool) {
            (_, Some(path)) => path.display().to_string(),
            (Source::Url { url }, None) => url.to_string(),
            _ => name.clone(),
        };

        let item = match self
            .ledger
            .create_item(source.kind(), &name, &content_ref, origin)
            .await
        {
            Ok(item) => item,
            Err(err) => {
                if let Some(path) = &spool {
                    remove_spool(path).await;
                }
                return Err(err.into());
            }
        };
        tracing::info!(
            item = %item.id,
            kind = source.kind().as_str(),
            name = %name,
            origin = origin.as_str(),
            "Ingestion accepted"
        );

        let track_upload = origin == Origin::User && source.kind() == SourceKind::Pdf;
        if track_upload && let Source::Pdf { bytes, .. } = &source {
            if let Err(err) = self
                .ledger
                .record_upload(session_id, &name, bytes.len())
                .await
            {
                tracing::warn!(item = %item.id, error = %err, "Failed to record user upload");
            }
        }

        let result = self.process(&item, &source, origin, session_id).await;
        if let Some(path) = &spool {
            remove_spool(path).await;
        }

        let outcome = match &result {
            Ok(report) => {
                tracing::info!(
                    item = %item.id,
                    chunks_attempted = report.chunks_attempted,
                    chunks_indexed = report.chunks_indexed,
                    "Ingestion processed"
                );
                ItemOutcome::Processed
            }
            Err(err) => {
                tracing::warn!(item = %item.id, error = %err, "Ingestion failed");
                ItemOutcome::Failed {
                    error: err.to_string(),
                }
            }
        };
        if let Err(err) = self.ledger.finish_item(&item.id, &outcome).await {
            tracing::error!(item = %item.id, error = %err, "Failed to record terminal status");
        }
        if track_upload {
            if let Err(err) = self.ledger.finish_upload(session_id, &name, &outcome).await {
                tracing::warn!(item = %item.id, error = %err, "Failed to finish user upload row");
            }
        }

        result.map_err(IngestError::from)
    }

    async fn process(
        &self,
        item: &KnowledgeItem,
        source: &Source,
        origin: Origin,
        session_id: Option<&str>,
    ) -> Result<IngestReport, ExtractError> {
        let text = match source {
            Source::Pdf { bytes, .. } => extract::pdf::extract_text(bytes)?,
            Source::Url { url } => extract::web::fetch_text(&self.http, url).await?,
        };

        let mut chunks_attempted = 0;
        let mut chunks_indexed = 0;
        for chunk in chunk_text(&text, self.chunk_window) {
            chunks_attempted += 1;
            match self.index_chunk(chunk, item, origin, session_id).await {
                Ok(()) => chunks_indexed += 1,
                Err(err) => {
                    tracing::warn!(
                        item = %item.id,
                        chunk = chunks_attempted,
                        error = %err,
                        "Skipping chunk after embed/upsert failure"
                    );
                }
            }
        }

        if chunks_attempted == 0 {
            return Err(ExtractError::EmptyContent);
        }
        Ok(IngestReport {
            item_id: item.id.clone(),
            name: item.name.clone(),
            chunks_attempted,
            chunks_indexed,
        })
    }

    async fn index_chunk(
        &self,
        chunk: &str,
        item: &KnowledgeItem,
        origin: Origin,
        session_id: Option<&str>,
    ) -> Result<(), ChunkIndexError> {
        let values = self.embedder.embed(chunk).await?;
        self.index
            .upsert(VectorRecord {
                id: Uuid::new_v4().to_string(),
                values,
                metadata: VectorMetadata {
                    text: chunk.to_string(),
                    origin: origin.as_str().to_string(),
                    source: item.name.clone(),
                    session_id: session_id.map(str::to_string),
                },
            })
            .await?;
        Ok(())
    }

    async fn spool(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let path = self
            .upload_dir
            .join(format!("{}_{file_name}", Uuid::new_v4()));
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }
}

async fn remove_spool(path: &Path) {
    if let Err(err) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %err, "Failed to remove spooled upload");
    }
}
