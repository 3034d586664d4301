pub mod migrations;
pub mod schema;

use rusqlite::{Connection, ErrorCode};
use serde::Serialize;
use sqlite_vec::sqlite3_vec_init;
use std::path::Path;
use std::sync::Once;

use crate::error::{MemoryError, Result};

static SQLITE_VEC_INIT: Once = Once::new();

/// How long a writer waits on a locked database before failing.
pub const BUSY_TIMEOUT_MS: u64 = 5000;

/// Register the sqlite-vec extension globally. Safe to call multiple times.
pub fn load_sqlite_vec() {
    // SAFETY: sqlite3_vec_init has the signature sqlite3_auto_extension expects;
    // the transmute only erases the argument types of the entry point.
    SQLITE_VEC_INIT.call_once(|| unsafe {
        rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
            sqlite3_vec_init as *const (),
        )));
    });
}

/// Open (or create) a memory database at the given path, with all extensions
/// loaded and schema initialized.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| MemoryError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    load_sqlite_vec();

    let conn = Connection::open(path)?;

    // WAL lets readers proceed while a write transaction is open
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.busy_timeout(std::time::Duration::from_millis(BUSY_TIMEOUT_MS))?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    schema::init_schema(&conn)?;
    migrations::run_migrations(&conn)?;

    tracing::info!(path = %path.display(), "database initialized");
    Ok(conn)
}

/// Open an in-memory database, used by tests and throwaway agents.
pub fn open_memory_database() -> Result<Connection> {
    load_sqlite_vec();
    let conn = Connection::open_in_memory()?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    schema::init_schema(&conn)?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

/// Result of [`check_database_health`].
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub integrity_ok: bool,
    pub integrity_details: String,
    pub fts_ok: bool,
    pub schema_version: u32,
    pub sqlite_vec_version: String,
    pub embedding_model: Option<String>,
    pub chunk_count: u64,
    pub embedding_count: u64,
    /// Embeddings whose chunk no longer exists. Always 0 on a healthy store.
    pub orphaned_embeddings: u64,
}

/// Run SQLite's integrity check plus FTS5's own consistency check.
pub fn check_database_health(conn: &Connection) -> rusqlite::Result<HealthReport> {
    let integrity_details: String =
        conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
    let integrity_ok = integrity_details == "ok";

    // rank = 1 also compares the index against `chunks`; a mismatch raises
    // SQLITE_CORRUPT_VTAB, anything else is a real failure
    let fts_ok = match conn.execute(
        "INSERT INTO chunks_fts(chunks_fts, rank) VALUES('integrity-check', 1)",
        [],
    ) {
        Ok(_) => true,
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::DatabaseCorrupt => {
            false
        }
        Err(e) => return Err(e),
    };

    let chunk_count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |r| r.get(0))?;
    let embedding_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM chunk_embeddings", [], |r| r.get(0))?;
    let orphaned_embeddings: i64 = conn.query_row(
        "SELECT COUNT(*) FROM chunk_embeddings e \
         WHERE NOT EXISTS (SELECT 1 FROM chunks c WHERE c.id = e.chunk_id)",
        [],
        |r| r.get(0),
    )?;

    Ok(HealthReport {
        integrity_ok,
        integrity_details,
        fts_ok,
        schema_version: migrations::get_schema_version(conn)?,
        sqlite_vec_version: conn.query_row("SELECT vec_version()", [], |r| r.get(0))?,
        embedding_model: migrations::get_embedding_model(conn)?,
        chunk_count: chunk_count as u64,
        embedding_count: embedding_count as u64,
        orphaned_embeddings: orphaned_embeddings as u64,
    })
}
