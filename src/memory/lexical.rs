//! Chunk rows and the FTS5 BM25 index over their text.
//!
//! `chunks_fts` is an external-content table, so every insert or delete on
//! `chunks` is mirrored here by hand within the caller's transaction.

use rusqlite::{params, Connection, Row};

use crate::memory::types::{Chunk, SearchResult, TextChunk};

const CHUNK_COLUMNS: &str = "id, file_path, text, start_offset, end_offset";

/// Insert one file's chunks and index them. Returns the new ids in order.
pub fn index_chunks(
    conn: &Connection,
    file_path: &str,
    chunks: &[TextChunk],
    indexed_at: &str,
) -> rusqlite::Result<Vec<i64>> {
    let mut insert_chunk = conn.prepare(
        "INSERT INTO chunks (file_path, text, start_offset, end_offset, indexed_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    // Must use the same rowid as the corresponding `chunks` row
    let mut insert_fts = conn.prepare(
        "INSERT INTO chunks_fts (rowid, text, file_path) VALUES (?1, ?2, ?3)",
    )?;

    let mut ids = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        insert_chunk.execute(params![
            file_path,
            chunk.text,
            chunk.start as i64,
            chunk.end as i64,
            indexed_at,
        ])?;
        let id = conn.last_insert_rowid();
        insert_fts.execute(params![id, chunk.text, file_path])?;
        ids.push(id);
    }
    Ok(ids)
}

/// Delete every chunk of `file_path` from the index and the chunk table.
/// Returns the number of chunks removed.
///
/// Embeddings are not touched here; see
/// [`vector::delete_for_file`](crate::memory::vector::delete_for_file).
pub fn remove_chunks_for_file(conn: &Connection, file_path: &str) -> rusqlite::Result<usize> {
    // FTS5 reads the old values from `chunks`, so this must run first
    conn.execute(
        "DELETE FROM chunks_fts WHERE rowid IN (SELECT id FROM chunks WHERE file_path = ?1)",
        params![file_path],
    )?;
    conn.execute("DELETE FROM chunks WHERE file_path = ?1", params![file_path])
}

/// BM25 keyword search. Results are sorted ascending by rank (FTS5 rank is
/// negative; more negative is better), ties by chunk id.
pub fn search(conn: &Connection, query: &str, limit: usize) -> rusqlite::Result<Vec<SearchResult>> {
    let escaped = escape_fts_query(query);
    if escaped.is_empty() {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare(
        "SELECT c.id, c.file_path, c.text, c.start_offset, c.end_offset, chunks_fts.rank \
         FROM chunks_fts JOIN chunks c ON c.id = chunks_fts.rowid \
         WHERE chunks_fts MATCH ?1 \
         ORDER BY chunks_fts.rank, c.id \
         LIMIT ?2",
    )?;
    let results = stmt
        .query_map(params![escaped, limit as i64], |row| {
            let chunk = chunk_from_row(row)?;
            Ok(SearchResult {
                chunk_id: chunk.id,
                file_path: chunk.file_path,
                text: chunk.text,
                start_offset: chunk.start_offset,
                end_offset: chunk.end_offset,
                rank: row.get(5)?,
                similarity: None,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(query = %escaped, hits = results.len(), "lexical search");
    Ok(results)
}

/// Escape a user query for FTS5 MATCH syntax.
///
/// Wraps each whitespace-delimited word in double quotes and joins with spaces
/// so FTS5 treats them as individual terms (implicit AND). Words without any
/// alphanumeric character are dropped: they can never match a token.
pub fn escape_fts_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(|word| word.replace('"', ""))
        .filter(|word| word.chars().any(char::is_alphanumeric))
        .map(|word| format!("\"{word}\""))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn get_chunk(conn: &Connection, chunk_id: i64) -> rusqlite::Result<Option<Chunk>> {
    use rusqlite::OptionalExtension;

    conn.query_row(
        &format!("SELECT {CHUNK_COLUMNS} FROM chunks WHERE id = ?1"),
        params![chunk_id],
        chunk_from_row,
    )
    .optional()
}

/// All chunks of one file, in offset order.
pub fn chunks_for_file(conn: &Connection, file_path: &str) -> rusqlite::Result<Vec<Chunk>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CHUNK_COLUMNS} FROM chunks WHERE file_path = ?1 ORDER BY id"
    ))?;
    let chunks = stmt
        .query_map(params![file_path], chunk_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(chunks)
}

/// Distinct file paths with at least one chunk, sorted.
pub fn indexed_files(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT file_path FROM chunks ORDER BY file_path")?;
    let files = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(files)
}

/// Map the leading [`CHUNK_COLUMNS`] of a row.
pub(crate) fn chunk_from_row(row: &Row<'_>) -> rusqlite::Result<Chunk> {
    Ok(Chunk {
        id: row.get(0)?,
        file_path: row.get(1)?,
        text: row.get(2)?,
        start_offset: row.get::<_, i64>(3)? as usize,
        end_offset: row.get::<_, i64>(4)? as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn text_chunk(text: &str) -> TextChunk {
        TextChunk {
            text: text.to_string(),
            start: 0,
            end: text.chars().count(),
        }
    }

    #[test]
    fn test_escape_fts_query() {
        assert_eq!(escape_fts_query("hello world"), "\"hello\" \"world\"");
        assert_eq!(escape_fts_query("rust OR python"), "\"rust\" \"OR\" \"python\"");
        assert_eq!(escape_fts_query("  spaces  "), "\"spaces\"");
        assert_eq!(escape_fts_query(""), "");
        assert_eq!(escape_fts_query("say \"hi\""), "\"say\" \"hi\"");
        assert_eq!(escape_fts_query("@ / . \"\""), "");
    }

    #[test]
    fn special_characters_do_not_break_the_parser() {
        let conn = db::open_memory_database().unwrap();
        index_chunks(
            &conn,
            "contacts.md",
            &[text_chunk("Email alice@example.com about the docs/api.md rewrite")],
            "2026-01-01T00:00:00Z",
        )
        .unwrap();

        for query in [
            "alice@example.com",
            "docs/api.md",
            "NEAR(",
            "\"unbalanced",
            "col:umn",
            "wild*",
            "a AND",
            "-neg",
            "(paren)",
        ] {
            assert!(search(&conn, query, 10).is_ok(), "query {query:?} errored");
        }

        let hits = search(&conn, "alice@example.com", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file_path, "contacts.md");
    }

    #[test]
    fn results_sorted_by_rank() {
        let conn = db::open_memory_database().unwrap();
        index_chunks(
            &conn,
            "a.md",
            &[
                text_chunk("rust appears once here among many other unrelated words"),
                text_chunk("rust rust rust"),
            ],
            "2026-01-01T00:00:00Z",
        )
        .unwrap();

        let hits = search(&conn, "rust", 10).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].rank <= hits[1].rank);
        assert!(hits[0].rank < 0.0);
        assert_eq!(hits[0].text, "rust rust rust");
    }

    #[test]
    fn remove_clears_index() {
        let conn = db::open_memory_database().unwrap();
        index_chunks(&conn, "a.md", &[text_chunk("alpha beta")], "now").unwrap();
        index_chunks(&conn, "b.md", &[text_chunk("alpha gamma")], "now").unwrap();

        assert_eq!(remove_chunks_for_file(&conn, "a.md").unwrap(), 1);
        let hits = search(&conn, "alpha", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file_path, "b.md");
        assert_eq!(remove_chunks_for_file(&conn, "missing.md").unwrap(), 0);
    }

    #[test]
    fn limit_bounds_results() {
        let conn = db::open_memory_database().unwrap();
        let chunks: Vec<TextChunk> = (0..8).map(|i| text_chunk(&format!("note {i} about coffee"))).collect();
        index_chunks(&conn, "log.md", &chunks, "now").unwrap();

        assert_eq!(search(&conn, "coffee", 5).unwrap().len(), 5);
        assert_eq!(search(&conn, "coffee", 50).unwrap().len(), 8);
    }
}
