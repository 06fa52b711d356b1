//! Inputs, outcomes, and errors of the ingestion pipeline.

use thiserror::Error;
use url::Url;

use crate::extract::ExtractError;
use crate::ledger::{LedgerError, SourceKind};

/// One knowledge source accepted for ingestion.
#[derive(Debug, Clone)]
pub enum Source {
    /// An uploaded PDF document.
    Pdf {
        /// Original file name, used as the item's display name.
        file_name: String,
        /// Raw PDF bytes.
        bytes: Vec<u8>,
    },
    /// A web page to fetch and strip.
    Url {
        /// Validated absolute URL.
        url: Url,
    },
}

impl Source {
    /// Ledger kind of this source.
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Pdf { .. } => SourceKind::Pdf,
            Self::Url { .. } => SourceKind::Url,
        }
    }

    /// Display name: the file name for PDFs, the host for URLs.
    pub fn display_name(&self) -> String {
        match self {
            Self::Pdf { file_name, .. } => file_name.clone(),
            Self::Url { url } => url
                .host_str()
                .map_or_else(|| url.to_string(), str::to_string),
        }
    }
}

/// Auditable summary of one completed ingestion.
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// Identifier of the knowledge item that was processed.
    pub item_id: String,
    /// Display name of the source.
    pub name: String,
    /// Chunks produced from the extracted text.
    pub chunks_attempted: usize,
    /// Chunks that made it into the vector index.
    pub chunks_indexed: usize,
}

/// Errors surfaced by [`super::IngestPipeline::ingest`].
#[derive(Debug, Error)]
pub enum IngestError {
    /// Extraction failed; the knowledge item was marked `failed`.
    #[error("{0}")]
    Extraction(#[from] ExtractError),
    /// Ledger bookkeeping failed.
    #[error("ledger write failed: {0}")]
    Ledger(#[from] LedgerError),
    /// The uploaded file could not be spooled to local storage.
    #[error("failed to spool upload: {0}")]
    Spool(#[from] std::io::Error),
}
