use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

use crate::db::migrations;
use crate::memory::vector;

/// Response from [`index_stats`].
#[derive(Debug, Serialize)]
pub struct IndexStats {
    pub files: u64,
    pub chunks: u64,
    pub embedded_chunks: u64,
    pub pending_embeddings: u64,
    /// Distinct embedding lengths in the store. More than one entry means the
    /// embedding model changed without a re-embed.
    pub embedding_dimensions: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    pub schema_version: u32,
    pub db_size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_indexed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_indexed: Option<String>,
}

/// Compute index statistics.
///
/// `db_path` is used for file size calculation; pass None for in-memory databases.
pub fn index_stats(conn: &Connection, db_path: Option<&Path>) -> rusqlite::Result<IndexStats> {
    let (files, chunks) = count_chunks(conn)?;
    let embedded_chunks = count_embedded(conn)?;
    let (oldest, newest) = indexed_time_range(conn)?;

    let db_size_bytes = db_path
        .and_then(|p| std::fs::metadata(p).ok())
        .map(|m| m.len())
        .unwrap_or(0);

    Ok(IndexStats {
        files,
        chunks,
        embedded_chunks,
        pending_embeddings: chunks.saturating_sub(embedded_chunks),
        embedding_dimensions: vector::stored_dimensions(conn)?,
        embedding_model: migrations::get_embedding_model(conn)?,
        schema_version: migrations::get_schema_version(conn)?,
        db_size_bytes,
        oldest_indexed: oldest,
        newest_indexed: newest,
    })
}

/// Distinct files and total chunks.
fn count_chunks(conn: &Connection) -> rusqlite::Result<(u64, u64)> {
    let (files, chunks): (i64, i64) = conn.query_row(
        "SELECT COUNT(DISTINCT file_path), COUNT(*) FROM chunks",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok((files as u64, chunks as u64))
}

/// Embeddings whose chunk still exists.
fn count_embedded(conn: &Connection) -> rusqlite::Result<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM chunk_embeddings e JOIN chunks c ON c.id = e.chunk_id",
        [],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

fn indexed_time_range(conn: &Connection) -> rusqlite::Result<(Option<String>, Option<String>)> {
    conn.query_row(
        "SELECT MIN(indexed_at), MAX(indexed_at) FROM chunks",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
}
