//! Ingestion pipeline: extract, chunk, embed, and upsert with per-item status
//! tracking.
//!
//! Each ingestion creates its own knowledge item, so concurrent ingestions never
//! contend on a status row. Per-chunk embedding or upsert failures are skipped in
//! favor of availability; the returned [`IngestReport`] carries the attempted and
//! indexed counts so partial success stays auditable.

/// Fixed-window text chunking.
pub mod chunking;
mod pipeline;
mod types;

pub use chunking::chunk_text;
pub use pipeline::IngestPipeline;
pub use types::{IngestError, IngestReport, Source};
