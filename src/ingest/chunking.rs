//! Fixed-window text chunking.
//!
//! Retrieval quality is deliberately traded for throughput here: chunks are plain
//! character windows with no overlap and no awareness of word or sentence boundaries.
//! The iterator is lazy and borrows the input, so callers can restart simply by
//! calling [`chunk_text`] again.

/// Split `text` into consecutive windows of at most `window` characters.
///
/// Every chunk except possibly the last has exactly `window` characters, chunks are
/// non-empty, and concatenating them reproduces the input. Empty input yields no
/// chunks. Windows are measured in `char`s so multi-byte input never splits inside
/// a code point.
pub fn chunk_text(text: &str, window: usize) -> Chunks<'_> {
    Chunks {
        rest: text,
        // A zero window would never make progress; the smallest useful window is one char.
        window: window.max(1),
    }
}

/// Lazy iterator over fixed-size character windows of a source text.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    rest: &'a str,
    window: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }

        let split = self
            .rest
            .char_indices()
            .nth(self.window)
            .map_or(self.rest.len(), |(idx, _)| idx);
        let (chunk, rest) = self.rest.split_at(split);
        self.rest = rest;
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::chunk_text;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert_eq!(chunk_text("", 500).count(), 0);
    }

    #[test]
    fn chunk_count_matches_ceiling_division() {
        for (len, window, expected) in [(1, 500, 1), (500, 500, 1), (501, 500, 2), (1499, 500, 3)]
        {
            let text = "x".repeat(len);
            assert_eq!(chunk_text(&text, window).count(), expected, "len={len}");
        }
    }

    #[test]
    fn concatenation_reconstructs_input() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(40);
        let joined: String = chunk_text(&text, 500).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn all_chunks_except_last_are_full_windows() {
        let text = "a".repeat(1234);
        let chunks: Vec<&str> = chunk_text(&text, 500).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 500);
        assert_eq!(chunks[1].len(), 500);
        assert_eq!(chunks[2].len(), 234);
    }

    #[test]
    fn windows_count_chars_not_bytes() {
        let text = "é".repeat(750);
        let chunks: Vec<&str> = chunk_text(&text, 500).collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 500);
        assert_eq!(chunks[1].chars().count(), 250);
    }

    #[test]
    fn iterator_is_restartable() {
        let text = "restartable sequence".repeat(30);
        let first: Vec<&str> = chunk_text(&text, 128).collect();
        let second: Vec<&str> = chunk_text(&text, 128).collect();
        assert_eq!(first, second);
    }
}
