//! Per-agent memory search engine.
//!
//! memdex turns an agent's markdown memory files into chunked, searchable
//! knowledge. Each file is split into overlapping chunks, indexed for BM25
//! keyword search, and (once an external model has produced them) matched
//! by embedding similarity. The two signals are merged via Reciprocal Rank
//! Fusion.
//!
//! # Architecture
//!
//! - **Storage**: one SQLite file per agent, FTS5 for keyword search and
//!   [sqlite-vec](https://github.com/asg017/sqlite-vec) scalar functions for
//!   cosine distance
//! - **Chunking**: character-offset windows with a fixed overlap
//! - **Search**: lexical, vector, or hybrid; every result's `rank` is "lower is better"
//! - **Embeddings**: supplied by the caller through [`embedding::EmbeddingProvider`]
//!   and written back by [`embedding::backfill::Backfill`]
//!
//! ```no_run
//! use memdex::config::IndexSettings;
//! use memdex::memory::index::MemoryIndex;
//!
//! # fn main() -> memdex::error::Result<()> {
//! let mut index = MemoryIndex::open("agent/memory.db", &IndexSettings::default())?;
//! index.index_file("MEMORY.md", "Prefers tea over coffee.")?;
//! for hit in index.search("tea", None)? {
//!     println!("{} {:.3} {}", hit.file_path, hit.rank, hit.text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML files and environment variables
//! - [`db`] - SQLite database initialization, schema, migrations, and health checks
//! - [`embedding`] - Embedding provider boundary and backfill loop
//! - [`error`] - The engine's error type
//! - [`memory`] - Chunker, lexical index, vector store, fusion, and the facade

pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod memory;

pub use error::MemoryError;
pub use memory::index::MemoryIndex;
