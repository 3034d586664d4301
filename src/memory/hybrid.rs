//! Reciprocal Rank Fusion of lexical and vector results.

use rusqlite::Connection;
use std::collections::HashMap;

use crate::config::SearchConfig;
use crate::error::Result;
use crate::memory::types::SearchResult;
use crate::memory::{lexical, vector};

/// Fuse two ranked lists of chunk ids.
///
/// An item at 1-based position `p` of a list contributes `1 / (k + p)`; items
/// missing from a list get nothing from it. Returns the union of both lists
/// sorted by fused score descending, ties broken by ascending chunk id.
pub fn reciprocal_rank_fusion(lexical: &[i64], vector: &[i64], k: usize) -> Vec<(i64, f64)> {
    let mut scores: HashMap<i64, f64> = HashMap::new();

    for list in [lexical, vector] {
        for (position, id) in list.iter().enumerate() {
            *scores.entry(*id).or_insert(0.0) += 1.0 / (k as f64 + (position + 1) as f64);
        }
    }

    let mut fused: Vec<(i64, f64)> = scores.into_iter().collect();
    fused.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    fused
}

/// Lexical + vector search merged via RRF.
///
/// Each branch fetches `limit * candidate_multiplier` candidates. The returned
/// `rank` is the negated fused score; `similarity` is not set.
pub fn hybrid_search(
    conn: &Connection,
    query: &str,
    query_vector: &[f32],
    limit: usize,
    config: &SearchConfig,
) -> Result<Vec<SearchResult>> {
    let candidate_limit = limit.saturating_mul(config.candidate_multiplier.max(1));

    // 1. FTS5 BM25 search
    let lexical_results = lexical::search(conn, query, candidate_limit)?;

    // 2. Cosine scan
    let vector_results = vector::vector_search(conn, query_vector, candidate_limit)?;

    // 3. RRF merge
    let lexical_ids: Vec<i64> = lexical_results.iter().map(|r| r.chunk_id).collect();
    let vector_ids: Vec<i64> = vector_results.iter().map(|r| r.chunk_id).collect();
    let fused = reciprocal_rank_fusion(&lexical_ids, &vector_ids, config.rrf_k);

    // 4. Attach chunk data from whichever branch found the chunk
    let mut by_id: HashMap<i64, SearchResult> = vector_results
        .into_iter()
        .chain(lexical_results)
        .map(|r| (r.chunk_id, r))
        .collect();

    let results: Vec<SearchResult> = fused
        .into_iter()
        .take(limit)
        .filter_map(|(id, score)| {
            by_id.remove(&id).map(|hit| SearchResult {
                rank: -score,
                similarity: None,
                ..hit
            })
        })
        .collect();

    tracing::debug!(
        lexical = lexical_ids.len(),
        vector = vector_ids.len(),
        returned = results.len(),
        "hybrid search"
    );
    Ok(results)
}
