//! Error type for the memory search engine.
//!
//! "Nothing found" is never an error: lookups return `None` and searches
//! return an empty vec. Everything here is either a caller mistake rejected
//! before storage is touched, or a storage failure surfaced unchanged.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`MemoryIndex`](crate::memory::index::MemoryIndex) and
/// the modules underneath it.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Malformed input: empty file path, zero limit, unusable vector.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Cosine similarity requested between vectors of different length.
    #[error("vector dimension mismatch: query has {query} dimensions, stored embeddings have {stored}")]
    DimensionMismatch { query: usize, stored: usize },

    /// Any failure reported by SQLite (I/O, corruption, constraint violation).
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The directory holding the database file could not be created.
    #[error("failed to prepare storage directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MemoryError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// `true` for failures of the storage layer, as opposed to caller errors.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Io { .. })
    }
}

pub type Result<T, E = MemoryError> = std::result::Result<T, E>;
