//! Row models and status types for the SQLite status ledger.

use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;

/// Errors raised by ledger reads and writes.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Underlying SQLite failure.
    #[error("ledger database error: {0}")]
    Database(#[from] sqlx::Error),
    /// Attempted to move a knowledge item out of a terminal status.
    #[error("knowledge item {id} already reached a terminal status")]
    InvalidTransition {
        /// Identifier of the item whose transition was rejected.
        id: String,
    },
}

/// Kind of ingested source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Uploaded PDF document.
    Pdf,
    /// Fetched web page.
    Url,
}

impl SourceKind {
    /// Ledger representation of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Url => "URL",
        }
    }
}

/// Who initiated an ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Added through the admin surface.
    Admin,
    /// Added by an end user from the chat widget.
    User,
}

impl Origin {
    /// Ledger and vector-metadata representation of the origin.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

/// Terminal outcome applied to a `processing` knowledge item.
///
/// This is the only way a status leaves `processing`; there is no path back.
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    /// Ingestion completed (possibly with skipped chunks).
    Processed,
    /// Extraction failed or no chunks existed; the message is stored with the item.
    Failed {
        /// Human-readable failure reason.
        error: String,
    },
}

impl ItemOutcome {
    pub(crate) fn status_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Failed { .. } => "failed",
        }
    }

    pub(crate) fn error_message(&self) -> Option<&str> {
        match self {
            Self::Processed => None,
            Self::Failed { error } => Some(error),
        }
    }
}

/// One ingested source and its processing status.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct KnowledgeItem {
    /// Unique identifier (UUID).
    pub id: String,
    /// `PDF` or `URL`.
    pub kind: String,
    /// Display name (file name or host).
    pub name: String,
    /// Original content reference: spool file path or URL.
    pub content_ref: String,
    /// RFC3339 creation timestamp.
    pub added_at: String,
    /// `processing`, `processed`, or `failed`.
    pub status: String,
    /// `admin` or `user`.
    pub origin: String,
    /// Failure reason for `failed` items.
    pub error_message: Option<String>,
}

/// One chat session grouping turns under a client-supplied identifier.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SessionRow {
    /// Client-supplied session identifier.
    pub session_id: String,
    /// RFC3339 timestamp of the first message.
    pub started_at: String,
    /// RFC3339 timestamp of the most recent message.
    pub last_activity: String,
    /// Number of messages observed.
    pub message_count: i64,
    /// `active` or `ended`.
    pub status: String,
}

/// One recorded request/response exchange.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ChatLogRow {
    /// Session the turn belongs to.
    pub session_id: String,
    /// RFC3339 timestamp of the exchange.
    pub timestamp: String,
    /// What the user asked.
    pub user_message: String,
    /// What the model answered (markdown source).
    pub bot_response: String,
    /// Measured latency in seconds.
    pub response_time: f64,
}

/// Chat turn to append to the ledger.
#[derive(Debug, Clone)]
pub struct NewChatTurn {
    /// Session the turn belongs to.
    pub session_id: String,
    /// What the user asked.
    pub user_message: String,
    /// What the model answered.
    pub bot_response: String,
    /// Measured latency in seconds.
    pub response_seconds: f64,
}

/// Counters consumed by the dashboard.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DashboardStats {
    /// Total chat turns recorded.
    pub total_chats: i64,
    /// Sessions currently in the `active` status.
    pub active_sessions: i64,
    /// Knowledge items in any status.
    pub knowledge_items: i64,
}
