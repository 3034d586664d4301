//! Embedding storage and brute-force cosine search.
//!
//! Embeddings live in a plain table keyed by chunk id rather than a vec0
//! virtual table, because the dimension is chosen by the caller's model and is
//! not fixed by the schema. Similarity is computed by sqlite-vec's
//! `vec_distance_cosine` over every stored row.

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{MemoryError, Result};
use crate::memory::types::SearchResult;
use crate::memory::{bytes_to_embedding, embedding_to_bytes, now_rfc3339};

/// Reject vectors that cosine similarity is undefined for.
pub fn validate_vector(vector: &[f32]) -> Result<()> {
    if vector.is_empty() {
        return Err(MemoryError::validation("vector must not be empty"));
    }
    if vector.iter().any(|x| !x.is_finite()) {
        return Err(MemoryError::validation("vector contains NaN or infinite values"));
    }
    if vector.iter().all(|x| *x == 0.0) {
        return Err(MemoryError::validation("vector must not be all zeros"));
    }
    Ok(())
}

/// Insert or replace the embedding of `chunk_id`.
///
/// Returns `false` without storing anything when the chunk does not exist,
/// e.g. because its file was re-indexed while the embedding was computed.
pub fn store_embedding(conn: &Connection, chunk_id: i64, vector: &[f32]) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM chunks WHERE id = ?1)",
        params![chunk_id],
        |row| row.get(0),
    )?;
    if !exists {
        tracing::debug!(chunk_id, "dropping embedding for missing chunk");
        return Ok(false);
    }

    conn.execute(
        "INSERT INTO chunk_embeddings (chunk_id, embedding, dims, updated_at) \
         VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(chunk_id) DO UPDATE SET \
             embedding = excluded.embedding, \
             dims = excluded.dims, \
             updated_at = excluded.updated_at",
        params![
            chunk_id,
            embedding_to_bytes(vector),
            vector.len() as i64,
            now_rfc3339()
        ],
    )?;
    Ok(true)
}

pub fn get_embedding(conn: &Connection, chunk_id: i64) -> rusqlite::Result<Option<Vec<f32>>> {
    let bytes: Option<Vec<u8>> = conn
        .query_row(
            "SELECT embedding FROM chunk_embeddings WHERE chunk_id = ?1",
            params![chunk_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(bytes.map(|b| bytes_to_embedding(&b)))
}

pub fn has_embeddings(conn: &Connection) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM chunk_embeddings)",
        [],
        |row| row.get(0),
    )
}

/// Ids of every chunk that has no embedding yet, ascending.
pub fn chunk_ids_without_embeddings(conn: &Connection) -> rusqlite::Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT c.id FROM chunks c \
         LEFT JOIN chunk_embeddings e ON e.chunk_id = c.id \
         WHERE e.chunk_id IS NULL \
         ORDER BY c.id",
    )?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

/// Delete the embeddings of every chunk belonging to `file_path`.
pub fn delete_for_file(conn: &Connection, file_path: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM chunk_embeddings \
         WHERE chunk_id IN (SELECT id FROM chunks WHERE file_path = ?1)",
        params![file_path],
    )
}

/// Delete every embedding in the store.
pub fn clear_all(conn: &Connection) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM chunk_embeddings", [])
}

/// Distinct dimension counts currently stored, ascending.
pub fn stored_dimensions(conn: &Connection) -> rusqlite::Result<Vec<usize>> {
    let mut stmt = conn.prepare("SELECT DISTINCT dims FROM chunk_embeddings ORDER BY dims")?;
    let dims = stmt
        .query_map([], |row| row.get::<_, i64>(0))?
        .map(|r| r.map(|d| d as usize))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(dims)
}

/// Top `limit` chunks by cosine similarity to `query`, most similar first.
///
/// `rank` is the negated similarity so that lower means more relevant, as in
/// lexical search. An empty store yields an empty vec.
pub fn vector_search(conn: &Connection, query: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
    validate_vector(query)?;

    if let Some(stored) = stored_dimensions(conn)?
        .into_iter()
        .find(|d| *d != query.len())
    {
        return Err(MemoryError::DimensionMismatch {
            query: query.len(),
            stored,
        });
    }

    let mut stmt = conn.prepare(
        "SELECT c.id, c.file_path, c.text, c.start_offset, c.end_offset, \
                vec_distance_cosine(e.embedding, ?1) AS distance \
         FROM chunk_embeddings e JOIN chunks c ON c.id = e.chunk_id \
         ORDER BY distance, c.id \
         LIMIT ?2",
    )?;
    let results = stmt
        .query_map(params![embedding_to_bytes(query), limit as i64], |row| {
            let chunk = super::lexical::chunk_from_row(row)?;
            let distance: f64 = row.get(5)?;
            let similarity = 1.0 - distance;
            Ok(SearchResult {
                chunk_id: chunk.id,
                file_path: chunk.file_path,
                text: chunk.text,
                start_offset: chunk.start_offset,
                end_offset: chunk.end_offset,
                rank: -similarity,
                similarity: Some(similarity),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(dims = query.len(), hits = results.len(), "vector search");
    Ok(results)
}

/// Cosine similarity of two vectors. `None` when the lengths differ or either
/// vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }
    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::memory::lexical;
    use crate::memory::types::TextChunk;

    fn insert_chunks(conn: &Connection, file_path: &str, texts: &[&str]) -> Vec<i64> {
        let chunks: Vec<TextChunk> = texts
            .iter()
            .map(|t| TextChunk {
                text: t.to_string(),
                start: 0,
                end: t.chars().count(),
            })
            .collect();
        lexical::index_chunks(conn, file_path, &chunks, "2026-01-01T00:00:00Z").unwrap()
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]).unwrap() - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap().abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap() + 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]).is_none());
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).is_none());
    }

    #[test]
    fn sqlite_vec_agrees_with_cosine_similarity() {
        let conn = db::open_memory_database().unwrap();
        let ids = insert_chunks(&conn, "a.md", &["one", "two"]);
        let v1 = [0.3f32, 0.4, 0.5];
        let v2 = [0.9f32, -0.1, 0.2];
        store_embedding(&conn, ids[0], &v1).unwrap();
        store_embedding(&conn, ids[1], &v2).unwrap();

        let query = [0.5f32, 0.5, 0.1];
        let hits = vector_search(&conn, &query, 10).unwrap();
        for hit in hits {
            let stored = get_embedding(&conn, hit.chunk_id).unwrap().unwrap();
            let expected = cosine_similarity(&query, &stored).unwrap() as f64;
            assert!((hit.similarity.unwrap() - expected).abs() < 1e-5);
            assert!((hit.rank + expected).abs() < 1e-5);
        }
    }

    #[test]
    fn rejects_unusable_vectors() {
        for v in [vec![], vec![0.0f32, 0.0], vec![1.0, f32::NAN]] {
            assert!(matches!(validate_vector(&v), Err(MemoryError::Validation(_))));
        }
        assert!(validate_vector(&[0.0, 1.0]).is_ok());
    }

    #[test]
    fn store_for_missing_chunk_is_dropped() {
        let conn = db::open_memory_database().unwrap();
        assert!(!store_embedding(&conn, 42, &[1.0, 0.0]).unwrap());
        assert!(!has_embeddings(&conn).unwrap());
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let conn = db::open_memory_database().unwrap();
        let ids = insert_chunks(&conn, "a.md", &["one"]);
        store_embedding(&conn, ids[0], &[1.0, 0.0, 0.0]).unwrap();

        let err = vector_search(&conn, &[1.0, 0.0], 5).unwrap_err();
        assert!(matches!(err, MemoryError::DimensionMismatch { query: 2, stored: 3 }));
    }

    #[test]
    fn stored_dimensions_tracks_lengths() {
        let conn = db::open_memory_database().unwrap();
        let ids = insert_chunks(&conn, "a.md", &["one", "two"]);
        store_embedding(&conn, ids[0], &[1.0, 0.0, 0.0]).unwrap();
        store_embedding(&conn, ids[1], &[1.0, 0.0]).unwrap();
        assert_eq!(stored_dimensions(&conn).unwrap(), vec![2, 3]);
    }

    #[test]
    fn delete_for_file_only_touches_that_file() {
        let conn = db::open_memory_database().unwrap();
        let a = insert_chunks(&conn, "a.md", &["one"]);
        let b = insert_chunks(&conn, "b.md", &["two"]);
        store_embedding(&conn, a[0], &[1.0, 0.0]).unwrap();
        store_embedding(&conn, b[0], &[0.0, 1.0]).unwrap();

        assert_eq!(delete_for_file(&conn, "a.md").unwrap(), 1);
        assert!(get_embedding(&conn, a[0]).unwrap().is_none());
        assert!(get_embedding(&conn, b[0]).unwrap().is_some());
        assert_eq!(chunk_ids_without_embeddings(&conn).unwrap(), vec![a[0]]);
    }
}
