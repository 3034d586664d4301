//! Record and result types shared by the lexical, vector and hybrid paths.
//!
//! All three search entry points return [`SearchResult`] with the same sign
//! convention: a lower `rank` is more relevant.

use serde::Serialize;

/// A segment produced by the chunker, before it has an id.
///
/// `start` and `end` are character offsets into the chunked content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// A stored chunk, matching the `chunks` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub id: i64,
    pub file_path: String,
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

/// One ranked hit from `search`, `vector_search` or `hybrid_search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub chunk_id: i64,
    pub file_path: String,
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
    /// Lower is more relevant: BM25 rank, negated similarity, or negated RRF score.
    pub rank: f64,
    /// Raw cosine similarity; only set by vector search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

/// Outcome of [`MemoryIndex::index_file`](crate::memory::index::MemoryIndex::index_file).
#[derive(Debug, Clone, Serialize)]
pub struct IndexReport {
    pub file_path: String,
    /// Ids of the new chunk generation, in offset order.
    pub chunk_ids: Vec<i64>,
    /// Chunks of the previous generation that were replaced.
    pub removed: usize,
}
