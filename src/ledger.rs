//! Persistent status ledger backed by SQLite.
//!
//! The ledger records knowledge items, user uploads, sessions, and chat turns. It is
//! append/update only from this crate's point of view: the dashboard consumes the
//! rows, the pipeline and responder never read them back for their own logic (the
//! read methods here exist solely to serve the dashboard endpoints).
//!
//! Status transitions for knowledge items go through [`Ledger::finish_item`], the
//! single audited path out of `processing`. The UPDATE is guarded on the current
//! status, so a reversal attempt is observable as an [`LedgerError::InvalidTransition`]
//! instead of a silent overwrite.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use time::OffsetDateTime;
use uuid::Uuid;

mod models;

pub use models::{
    ChatLogRow, DashboardStats, ItemOutcome, KnowledgeItem, LedgerError, NewChatTurn, Origin,
    SessionRow, SourceKind,
};

/// Handle to the SQLite status ledger. Cloning shares the underlying pool.
#[derive(Clone)]
pub struct Ledger {
    pool: SqlitePool,
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS knowledge_base (
    id TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    name TEXT NOT NULL,
    content_ref TEXT NOT NULL,
    added_at TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'processing',
    origin TEXT NOT NULL DEFAULT 'admin',
    error_message TEXT
);
CREATE TABLE IF NOT EXISTS chat_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    user_message TEXT NOT NULL,
    bot_response TEXT NOT NULL,
    response_time REAL NOT NULL
);
CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT UNIQUE NOT NULL,
    started_at TEXT NOT NULL,
    last_activity TEXT NOT NULL,
    message_count INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'active'
);
CREATE TABLE IF NOT EXISTS user_uploads (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT,
    filename TEXT NOT NULL,
    file_type TEXT NOT NULL,
    file_size INTEGER NOT NULL,
    uploaded_at TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'processing',
    error_message TEXT
);
";

impl Ledger {
    /// Open (creating if missing) the SQLite database at `path` and ensure the schema.
    pub async fn connect(path: &str) -> Result<Self, LedgerError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        tracing::debug!(path, "Status ledger ready");
        Ok(Self { pool })
    }

    /// Create a knowledge item in the `processing` status and return the stored row.
    pub async fn create_item(
        &self,
        kind: SourceKind,
        name: &str,
        content_ref: &str,
        origin: Origin,
    ) -> Result<KnowledgeItem, LedgerError> {
        let item = KnowledgeItem {
            id: Uuid::new_v4().to_string(),
            kind: kind.as_str().to_string(),
            name: name.to_string(),
            content_ref: content_ref.to_string(),
            added_at: now_rfc3339(),
            status: "processing".to_string(),
            origin: origin.as_str().to_string(),
            error_message: None,
        };

        sqlx::query(
            "INSERT INTO knowledge_base (id, kind, name, content_ref, added_at, status, origin) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&item.id)
        .bind(&item.kind)
        .bind(&item.name)
        .bind(&item.content_ref)
        .bind(&item.added_at)
        .bind(&item.status)
        .bind(&item.origin)
        .execute(&self.pool)
        .await?;

        Ok(item)
    }

    /// Move a `processing` item to its terminal status.
    ///
    /// Exactly one transition is allowed per item; a second call (or a call against
    /// an unknown id) fails with [`LedgerError::InvalidTransition`].
    pub async fn finish_item(&self, id: &str, outcome: &ItemOutcome) -> Result<(), LedgerError> {
        let result = sqlx::query(
            "UPDATE knowledge_base SET status = ?1, error_message = ?2 \
             WHERE id = ?3 AND status = 'processing'",
        )
        .bind(outcome.status_str())
        .bind(outcome.error_message())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::InvalidTransition { id: id.to_string() });
        }
        tracing::debug!(item = id, status = outcome.status_str(), "Knowledge item finished");
        Ok(())
    }

    /// Record a user-initiated upload in the `processing` status.
    pub async fn record_upload(
        &self,
        session_id: Option<&str>,
        filename: &str,
        file_size: usize,
    ) -> Result<(), LedgerError> {
        sqlx::query(
            "INSERT INTO user_uploads (session_id, filename, file_type, file_size, uploaded_at, status) \
             VALUES (?1, ?2, 'PDF', ?3, ?4, 'processing')",
        )
        .bind(session_id)
        .bind(filename)
        .bind(file_size as i64)
        .bind(now_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Move a `processing` upload row to its terminal status.
    pub async fn finish_upload(
        &self,
        session_id: Option<&str>,
        filename: &str,
        outcome: &ItemOutcome,
    ) -> Result<(), LedgerError> {
        sqlx::query(
            "UPDATE user_uploads SET status = ?1, error_message = ?2 \
             WHERE session_id IS ?3 AND filename = ?4 AND status = 'processing'",
        )
        .bind(outcome.status_str())
        .bind(outcome.error_message())
        .bind(session_id)
        .bind(filename)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Create the session on first contact, or bump its activity counters.
    ///
    /// A single statement keeps the update atomic; concurrent bumps of the same
    /// session resolve last-writer-wins, which is acceptable for advisory counters.
    pub async fn touch_session(&self, session_id: &str) -> Result<(), LedgerError> {
        sqlx::query(
            "INSERT INTO sessions (session_id, started_at, last_activity, message_count, status) \
             VALUES (?1, ?2, ?2, 1, 'active') \
             ON CONFLICT(session_id) DO UPDATE SET \
                 last_activity = excluded.last_activity, \
                 message_count = sessions.message_count + 1",
        )
        .bind(session_id)
        .bind(now_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Mark a session `ended`. Ending an unknown session is a no-op.
    pub async fn end_session(&self, session_id: &str) -> Result<(), LedgerError> {
        sqlx::query("UPDATE sessions SET status = 'ended' WHERE session_id = ?1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Append one chat turn. Turns are never mutated or deleted.
    pub async fn record_chat(&self, turn: &NewChatTurn) -> Result<(), LedgerError> {
        sqlx::query(
            "INSERT INTO chat_logs (session_id, timestamp, user_message, bot_response, response_time) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&turn.session_id)
        .bind(now_rfc3339())
        .bind(&turn.user_message)
        .bind(&turn.bot_response)
        .bind(turn.response_seconds)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Dashboard counters.
    pub async fn stats(&self) -> Result<DashboardStats, LedgerError> {
        let total_chats: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chat_logs")
            .fetch_one(&self.pool)
            .await?;
        let active_sessions: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE status = 'active'")
                .fetch_one(&self.pool)
                .await?;
        let knowledge_items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM knowledge_base")
            .fetch_one(&self.pool)
            .await?;
        Ok(DashboardStats {
            total_chats,
            active_sessions,
            knowledge_items,
        })
    }

    /// Knowledge items, newest first.
    pub async fn knowledge_items(&self) -> Result<Vec<KnowledgeItem>, LedgerError> {
        let rows = sqlx::query_as::<_, KnowledgeItem>(
            "SELECT id, kind, name, content_ref, added_at, status, origin, error_message \
             FROM knowledge_base ORDER BY added_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Sessions ordered by most recent activity.
    pub async fn sessions(&self) -> Result<Vec<SessionRow>, LedgerError> {
        let rows = sqlx::query_as::<_, SessionRow>(
            "SELECT session_id, started_at, last_activity, message_count, status \
             FROM sessions ORDER BY last_activity DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Most recent chat turns, newest first.
    pub async fn recent_chats(&self, limit: i64) -> Result<Vec<ChatLogRow>, LedgerError> {
        let rows = sqlx::query_as::<_, ChatLogRow>(
            "SELECT session_id, timestamp, user_message, bot_response, response_time \
             FROM chat_logs ORDER BY timestamp DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
