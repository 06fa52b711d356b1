//! PDF text extraction.
//!
//! Pages are extracted one at a time so that a single corrupt page cannot sink the
//! whole document: unreadable pages are logged and skipped, and extraction fails only
//! when the document itself cannot be parsed or no page yielded any text.

use lopdf::Document;

use super::ExtractError;

/// Extract the concatenated text of every readable page in a PDF.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let document = Document::load_mem(bytes).map_err(|err| ExtractError::Pdf(err.to_string()))?;

    let mut blob = String::new();
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) => {
                blob.push_str(&text);
                blob.push('\n');
            }
            Err(err) => {
                tracing::warn!(page = page_number, error = %err, "Skipping unreadable PDF page");
            }
        }
    }

    if blob.trim().is_empty() {
        return Err(ExtractError::EmptyContent);
    }
    Ok(blob)
}
