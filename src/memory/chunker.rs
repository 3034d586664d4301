//! Splits memory file content into overlapping, offset-tracked chunks.
//!
//! Offsets count characters, not bytes, so they stay meaningful for callers
//! that slice the original file by character position. Consecutive chunks
//! share exactly `overlap_chars` characters; there are never gaps.

use crate::config::ChunkingConfig;
use crate::error::{MemoryError, Result};
use crate::memory::types::TextChunk;

#[derive(Debug, Clone)]
pub struct Chunker {
    max_chars: usize,
    overlap_chars: usize,
}

impl Chunker {
    pub fn new(config: &ChunkingConfig) -> Result<Self> {
        if config.max_chars == 0 {
            return Err(MemoryError::validation("chunking.max_chars must be positive"));
        }
        if config.overlap_chars == 0 {
            return Err(MemoryError::validation("chunking.overlap_chars must be positive"));
        }
        // Window ends are only pulled back into the second half of a window,
        // so an overlap below half the window guarantees forward progress.
        if config.overlap_chars * 2 >= config.max_chars {
            return Err(MemoryError::validation(format!(
                "chunking.overlap_chars ({}) must be less than half of max_chars ({})",
                config.overlap_chars, config.max_chars
            )));
        }
        Ok(Self {
            max_chars: config.max_chars,
            overlap_chars: config.overlap_chars,
        })
    }

    /// Chunk `content`. Deterministic; empty content yields no chunks.
    pub fn chunk(&self, content: &str) -> Vec<TextChunk> {
        if content.is_empty() {
            return Vec::new();
        }

        // Byte position of every char boundary, including the end of the string
        let bounds: Vec<usize> = content
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(content.len()))
            .collect();
        let total = bounds.len() - 1;

        let slice = |start: usize, end: usize| TextChunk {
            text: content[bounds[start]..bounds[end]].to_string(),
            start,
            end,
        };

        if total <= self.max_chars {
            return vec![slice(0, total)];
        }

        let chars: Vec<char> = content.chars().collect();
        let mut chunks = Vec::with_capacity(total / (self.max_chars - self.overlap_chars) + 1);
        let mut start = 0;
        loop {
            let window_end = (start + self.max_chars).min(total);
            if window_end == total {
                chunks.push(slice(start, total));
                break;
            }
            let end = self.break_point(&chars, start, window_end);
            chunks.push(slice(start, end));
            start = end - self.overlap_chars;
        }

        tracing::trace!(chars = total, chunks = chunks.len(), "chunked content");
        chunks
    }

    /// End of the window starting at `start`: just past the last newline in
    /// the window's second half, else just past the last whitespace, else the
    /// hard window end.
    fn break_point(&self, chars: &[char], start: usize, window_end: usize) -> usize {
        let floor = start + self.max_chars / 2;
        let tail = &chars[floor..window_end];

        tail.iter()
            .rposition(|c| *c == '\n')
            .or_else(|| tail.iter().rposition(|c| c.is_whitespace()))
            .map_or(window_end, |i| floor + i + 1)
    }
}

impl Default for Chunker {
    fn default() -> Self {
        let config = ChunkingConfig::default();
        Self {
            max_chars: config.max_chars,
            overlap_chars: config.overlap_chars,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_chunker() -> Chunker {
        Chunker::new(&ChunkingConfig {
            max_chars: 40,
            overlap_chars: 8,
        })
        .unwrap()
    }

    /// Assert offsets are ordered, gap-free, and the texts match the content.
    fn assert_covers(content: &str, chunks: &[TextChunk]) {
        let chars: Vec<char> = content.chars().collect();
        assert_eq!(chunks[0].start, 0);
        assert_eq!(chunks.last().unwrap().end, chars.len());
        for c in chunks {
            assert!(c.start < c.end);
            let expected: String = chars[c.start..c.end].iter().collect();
            assert_eq!(c.text, expected);
        }
        for pair in chunks.windows(2) {
            assert!(pair[1].start > pair[0].start, "starts must advance");
            assert!(pair[1].start <= pair[0].end, "no gaps between chunks");
        }
    }

    #[test]
    fn empty_content_yields_no_chunks() {
        assert!(Chunker::default().chunk("").is_empty());
    }

    #[test]
    fn short_content_is_one_chunk() {
        let chunks = Chunker::default().chunk("Hello world");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Hello world");
        assert_eq!(chunks[0].start, 0);
        assert_eq!(chunks[0].end, 11);
    }

    #[test]
    fn offsets_count_characters() {
        let content = "café ☕ naïve";
        let chunks = Chunker::default().chunk(content);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].end, content.chars().count());
        assert!(chunks[0].end < content.len());
    }

    #[test]
    fn long_content_overlaps_by_fixed_amount() {
        let content = "lorem ipsum dolor sit amet ".repeat(20);
        let chunker = small_chunker();
        let chunks = chunker.chunk(&content);

        assert!(chunks.len() > 1);
        assert_covers(&content, &chunks);
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end - pair[1].start, 8);
        }
        for c in &chunks {
            assert!(c.end - c.start <= 40);
        }
    }

    #[test]
    fn prefers_line_breaks() {
        let content = format!("{}\n{}", "a".repeat(30), "b ".repeat(40));
        let chunks = small_chunker().chunk(&content);
        assert_eq!(chunks[0].text, format!("{}\n", "a".repeat(30)));
        assert_covers(&content, &chunks);
    }

    #[test]
    fn unbroken_text_splits_at_window() {
        let content = "x".repeat(100);
        let chunks = small_chunker().chunk(&content);
        assert_eq!(chunks[0].end, 40);
        assert_eq!(chunks[1].start, 32);
        assert_covers(&content, &chunks);
    }

    #[test]
    fn multibyte_long_content() {
        let content = "日本語のテキスト ".repeat(30);
        let chunks = small_chunker().chunk(&content);
        assert!(chunks.len() > 1);
        assert_covers(&content, &chunks);
    }

    #[test]
    fn chunking_is_deterministic() {
        let content = "The quick brown fox.\nJumps over the lazy dog.\n".repeat(10);
        let chunker = small_chunker();
        assert_eq!(chunker.chunk(&content), chunker.chunk(&content));
    }

    #[test]
    fn rejects_bad_config() {
        let bad = [
            ChunkingConfig { max_chars: 0, overlap_chars: 0 },
            ChunkingConfig { max_chars: 100, overlap_chars: 0 },
            ChunkingConfig { max_chars: 100, overlap_chars: 50 },
        ];
        for config in &bad {
            assert!(matches!(
                Chunker::new(config),
                Err(MemoryError::Validation(_))
            ));
        }
    }
}
