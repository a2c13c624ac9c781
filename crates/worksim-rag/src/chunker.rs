//! Sliding-window text chunker

/// Window length in characters
pub const DEFAULT_CHUNK_SIZE: usize = 300;
/// Overlap between consecutive windows; small chunks with a large overlap
/// keep retrieval granular without losing sentence boundaries
pub const DEFAULT_CHUNK_OVERLAP: usize = 150;
/// Windows whose trimmed length does not exceed this are boundary noise
pub const MIN_CHUNK_CHARS: usize = 20;

/// Split text into overlapping windows of `size` characters, advancing by
/// `size - overlap` each step.
///
/// Operates on characters, not bytes; the ingested manuals are Korean and
/// byte windows would split codepoints. Output order matches document order.
/// Empty or all-whitespace input yields an empty vec, which callers treat as
/// an ingestion failure.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    if size == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let step = size.saturating_sub(overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + size).min(chars.len());
        let window: String = chars[start..end].iter().collect();
        let trimmed = window.trim();
        if trimmed.chars().count() > MIN_CHUNK_CHARS {
            chunks.push(trimmed.to_string());
        }
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(chunk_text("", DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP).is_empty());
        assert!(chunk_text("   \n\t  ", DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP).is_empty());
    }

    #[test]
    fn test_short_windows_are_filtered() {
        // 21 trimmed chars is the first kept length
        assert!(chunk_text(&"a".repeat(20), 300, 150).is_empty());
        assert_eq!(chunk_text(&"a".repeat(21), 300, 150).len(), 1);
    }

    #[test]
    fn test_window_offsets_advance_by_step() {
        let text: String = (0..1000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chunks = chunk_text(&text, 300, 150);

        // start offsets 0, 150, 300, ... => ceil(1000/150) = 7 windows, all
        // longer than 20 chars after trimming
        assert_eq!(chunks.len(), 7);
        for (i, chunk) in chunks.iter().enumerate() {
            let start = i * 150;
            let expected_len = 300.min(1000 - start);
            assert_eq!(chunk.chars().count(), expected_len);
            // each chunk starts exactly where the window does
            assert_eq!(chunk.chars().next(), text.chars().nth(start));
        }
    }

    #[test]
    fn test_order_matches_source() {
        let text: String = (0..900)
            .map(|i| char::from_digit((i / 100) as u32, 10).unwrap())
            .collect();
        let chunks = chunk_text(&text, 300, 150);
        // leading digit of each chunk is non-decreasing => source order kept
        let firsts: Vec<char> = chunks.iter().map(|c| c.chars().next().unwrap()).collect();
        let mut sorted = firsts.clone();
        sorted.sort();
        assert_eq!(firsts, sorted);
    }

    #[test]
    fn test_multibyte_text_is_not_split_on_byte_boundaries() {
        let text = "안녕하세요 고객님, 무엇을 도와드릴까요? ".repeat(50);
        let chunks = chunk_text(&text, 300, 150);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 300);
        }
    }

    #[test]
    fn test_degenerate_overlap_still_terminates() {
        // overlap >= size clamps the step to 1 instead of looping forever
        let text = "x".repeat(100);
        let chunks = chunk_text(&text, 30, 30);
        assert!(!chunks.is_empty());
    }
}
