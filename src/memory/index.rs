//! The memory search engine facade.
//!
//! [`MemoryIndex`] owns one agent's database and is the only writer to it.
//! Every write runs in a single `BEGIN IMMEDIATE` transaction, so a reader
//! sees either the old or the new chunk set of a file, never a mix, and a
//! chunk's embedding disappears in the same commit as the chunk.

use rusqlite::{Connection, TransactionBehavior};
use std::path::{Path, PathBuf};

use crate::config::{IndexSettings, SearchConfig};
use crate::db::{self, migrations, HealthReport};
use crate::error::{MemoryError, Result};
use crate::memory::chunker::Chunker;
use crate::memory::stats::{self, IndexStats};
use crate::memory::types::{Chunk, IndexReport, SearchResult};
use crate::memory::{hybrid, lexical, now_rfc3339, vector};

pub struct MemoryIndex {
    conn: Connection,
    chunker: Chunker,
    search: SearchConfig,
    path: Option<PathBuf>,
}

impl MemoryIndex {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>, settings: &IndexSettings) -> Result<Self> {
        let path = path.as_ref();
        let conn = db::open_database(path)?;
        Self::from_connection(conn, settings, Some(path.to_path_buf()))
    }

    /// A throwaway in-memory store.
    pub fn open_in_memory(settings: &IndexSettings) -> Result<Self> {
        let conn = db::open_memory_database()?;
        Self::from_connection(conn, settings, None)
    }

    fn from_connection(
        conn: Connection,
        settings: &IndexSettings,
        path: Option<PathBuf>,
    ) -> Result<Self> {
        if settings.search.default_limit == 0 {
            return Err(MemoryError::validation("search.default_limit must be positive"));
        }
        Ok(Self {
            conn,
            chunker: Chunker::new(&settings.chunking)?,
            search: settings.search.clone(),
            path,
        })
    }

    /// Read-only access to the underlying connection, for diagnostics.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Database file path; `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // ── Writes ────────────────────────────────────────────────────────────────

    /// Chunk `content` and atomically replace the chunk set of `file_path`.
    ///
    /// Embeddings of the replaced chunks are removed; the new chunks start
    /// without embeddings.
    pub fn index_file(&mut self, file_path: &str, content: &str) -> Result<IndexReport> {
        validate_file_path(file_path)?;
        let chunks = self.chunker.chunk(content);
        let indexed_at = now_rfc3339();

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let embeddings_removed = vector::delete_for_file(&tx, file_path)?;
        let removed = lexical::remove_chunks_for_file(&tx, file_path)?;
        let chunk_ids = lexical::index_chunks(&tx, file_path, &chunks, &indexed_at)?;
        tx.commit()?;

        tracing::info!(
            file = file_path,
            chunks = chunk_ids.len(),
            removed,
            embeddings_removed,
            "indexed file"
        );
        Ok(IndexReport {
            file_path: file_path.to_string(),
            chunk_ids,
            removed,
        })
    }

    /// Atomically delete every chunk of `file_path` and their embeddings.
    /// Returns the number of chunks removed; 0 for an unknown path.
    pub fn remove_file(&mut self, file_path: &str) -> Result<usize> {
        validate_file_path(file_path)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let embeddings_removed = vector::delete_for_file(&tx, file_path)?;
        let removed = lexical::remove_chunks_for_file(&tx, file_path)?;
        tx.commit()?;

        tracing::info!(file = file_path, removed, embeddings_removed, "removed file");
        Ok(removed)
    }

    /// Insert or replace the embedding of `chunk_id`.
    ///
    /// Returns `false` when the chunk no longer exists; the vector is dropped.
    pub fn store_embedding(&mut self, chunk_id: i64, vector: &[f32]) -> Result<bool> {
        vector::validate_vector(vector)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let stored = vector::store_embedding(&tx, chunk_id, vector)?;
        tx.commit()?;
        Ok(stored)
    }

    /// Record the embedding model in use.
    ///
    /// If a different model was recorded before, every stored embedding is
    /// cleared in the same transaction so the backfill recomputes them all.
    /// Returns the number of embeddings cleared.
    pub fn set_embedding_model(&mut self, model: &str) -> Result<usize> {
        if model.trim().is_empty() {
            return Err(MemoryError::validation("embedding model must not be empty"));
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let previous = migrations::get_embedding_model(&tx)?;
        let cleared = match previous.as_deref() {
            Some(prev) if prev != model => vector::clear_all(&tx)?,
            _ => 0,
        };
        migrations::set_embedding_model(&tx, model)?;
        tx.commit()?;

        if cleared > 0 {
            tracing::warn!(
                previous = previous.as_deref().unwrap_or_default(),
                model,
                cleared,
                "embedding model changed, cleared stored embeddings"
            );
        }
        Ok(cleared)
    }

    // ── Searches ──────────────────────────────────────────────────────────────

    /// Lexical search. `None` uses the configured default limit.
    pub fn search(&self, query: &str, limit: Option<usize>) -> Result<Vec<SearchResult>> {
        let limit = limit.unwrap_or(self.search.default_limit);
        validate_limit(limit)?;
        Ok(lexical::search(&self.conn, query, limit)?)
    }

    /// Brute-force cosine search over every stored embedding.
    pub fn vector_search(&self, query_vector: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        validate_limit(limit)?;
        vector::vector_search(&self.conn, query_vector, limit)
    }

    /// Lexical and vector search fused with Reciprocal Rank Fusion.
    pub fn hybrid_search(
        &self,
        query: &str,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        validate_limit(limit)?;
        hybrid::hybrid_search(&self.conn, query, query_vector, limit, &self.search)
    }

    // ── Lookups ───────────────────────────────────────────────────────────────

    pub fn get_embedding(&self, chunk_id: i64) -> Result<Option<Vec<f32>>> {
        Ok(vector::get_embedding(&self.conn, chunk_id)?)
    }

    pub fn has_embeddings(&self) -> Result<bool> {
        Ok(vector::has_embeddings(&self.conn)?)
    }

    /// Chunks still waiting for an embedding, ascending.
    pub fn chunk_ids_without_embeddings(&self) -> Result<Vec<i64>> {
        Ok(vector::chunk_ids_without_embeddings(&self.conn)?)
    }

    pub fn get_chunk(&self, chunk_id: i64) -> Result<Option<Chunk>> {
        Ok(lexical::get_chunk(&self.conn, chunk_id)?)
    }

    pub fn chunks_for_file(&self, file_path: &str) -> Result<Vec<Chunk>> {
        Ok(lexical::chunks_for_file(&self.conn, file_path)?)
    }

    pub fn indexed_files(&self) -> Result<Vec<String>> {
        Ok(lexical::indexed_files(&self.conn)?)
    }

    pub fn embedding_model(&self) -> Result<Option<String>> {
        Ok(migrations::get_embedding_model(&self.conn)?)
    }

    pub fn stats(&self) -> Result<IndexStats> {
        Ok(stats::index_stats(&self.conn, self.path.as_deref())?)
    }

    pub fn health(&self) -> Result<HealthReport> {
        Ok(db::check_database_health(&self.conn)?)
    }
}

fn validate_file_path(file_path: &str) -> Result<()> {
    if file_path.trim().is_empty() {
        return Err(MemoryError::validation("file path must not be empty"));
    }
    Ok(())
}

fn validate_limit(limit: usize) -> Result<()> {
    if limit == 0 {
        return Err(MemoryError::validation("limit must be positive"));
    }
    Ok(())
}
