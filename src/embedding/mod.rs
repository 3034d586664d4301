//! The boundary to the embedding model.
//!
//! The engine never embeds text itself. A caller constructs an
//! [`EmbeddingProvider`] and hands it to a [`backfill::Backfill`], which fills
//! in vectors for chunks that do not have one yet.

pub mod backfill;

use anyhow::Result;

/// Trait for embedding text into vectors.
///
/// Implementations must use one model (and so one dimension) per memory store.
/// All methods are synchronous; async callers should wrap them in a blocking
/// task.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of text strings. Implementations may override for batched inference.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Identifier recorded in the store, e.g. `"text-embedding-3-small"`.
    fn model_id(&self) -> &str;
}
