//! Source extractors producing a single text blob per knowledge source.
//!
//! Both variants share the same contract: return the concatenated visible text of the
//! source, or an item-scoped [`ExtractError`] that the ingestion pipeline records as
//! the item's terminal `failed` status. Extraction never retries.

use thiserror::Error;

/// PDF text extraction, tolerant of unreadable pages.
pub mod pdf;
/// Web-page fetching and HTML tag stripping.
pub mod web;

/// Errors raised while extracting text from a source.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The source parsed but contained no readable text.
    #[error("no readable text found in source")]
    EmptyContent,
    /// The URL could not be fetched.
    #[error("failed to fetch URL: {0}")]
    Fetch(String),
    /// The PDF document could not be parsed.
    #[error("failed to read PDF: {0}")]
    Pdf(String),
}
