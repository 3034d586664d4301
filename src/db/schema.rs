//! SQL DDL for the memory store.
//!
//! Defines the `chunks`, `chunks_fts` (FTS5 external content), `chunk_embeddings`
//! and `schema_meta` tables. All DDL uses `IF NOT EXISTS` for idempotent
//! initialization. Changes after version 1 go through [`super::migrations`].

use rusqlite::Connection;

const SCHEMA_SQL: &str = r#"
-- One row per chunk. AUTOINCREMENT keeps ids monotonic and never reused.
CREATE TABLE IF NOT EXISTS chunks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_path TEXT NOT NULL,
    text TEXT NOT NULL,
    start_offset INTEGER NOT NULL CHECK(start_offset >= 0),
    end_offset INTEGER NOT NULL CHECK(end_offset > start_offset),
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chunks_file ON chunks(file_path);

-- Full-text search (BM25), kept in sync with `chunks` by hand
CREATE VIRTUAL TABLE IF NOT EXISTS chunks_fts USING fts5(
    text,
    file_path UNINDEXED,
    content='chunks',
    content_rowid='id'
);

-- At most one embedding per chunk, raw f32 bytes. `dims` lets searches
-- reject mismatched query vectors without decoding every blob.
CREATE TABLE IF NOT EXISTS chunk_embeddings (
    chunk_id INTEGER PRIMARY KEY REFERENCES chunks(id) ON DELETE CASCADE,
    embedding BLOB NOT NULL,
    dims INTEGER NOT NULL CHECK(dims > 0),
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_embeddings_dims ON chunk_embeddings(dims);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
