//! Backfill: compute embeddings for chunks that lack one.
//!
//! The provider is passed in explicitly; nothing here is global. Embeddings
//! may land long after the chunk was indexed, and a chunk replaced in the
//! meantime is simply skipped.

use anyhow::{ensure, Context, Result};
use serde::Serialize;
use std::sync::Arc;

use super::EmbeddingProvider;
use crate::memory::index::MemoryIndex;
use crate::memory::vector::validate_vector;

pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Counts from one [`Backfill::run`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    /// Embeddings written.
    pub embedded: usize,
    /// Chunks that vanished between listing and storing.
    pub skipped: usize,
    /// Embeddings cleared because the provider's model differs from the stored one.
    pub invalidated: usize,
}

pub struct Backfill {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl Backfill {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Whether any chunk is still waiting for an embedding.
    pub fn needs_run(index: &MemoryIndex) -> Result<bool> {
        Ok(!index.chunk_ids_without_embeddings()?.is_empty())
    }

    /// Embed every pending chunk, `batch_size` texts per provider call.
    ///
    /// Records the provider's model first; a model change clears the old
    /// vectors so they are all recomputed with the new one. The old vectors
    /// are only cleared once the new provider has produced a usable vector.
    pub fn run(&self, index: &mut MemoryIndex) -> Result<BackfillReport> {
        let model = self.provider.model_id();
        if index
            .embedding_model()?
            .is_some_and(|previous| previous != model)
        {
            self.check_provider(index)
                .with_context(|| format!("model {model} failed, keeping stored embeddings"))?;
        }

        let mut report = BackfillReport {
            invalidated: index
                .set_embedding_model(model)
                .context("failed to record embedding model")?,
            ..BackfillReport::default()
        };

        let pending = index.chunk_ids_without_embeddings()?;
        if pending.is_empty() {
            return Ok(report);
        }
        tracing::info!(
            pending = pending.len(),
            model = self.provider.model_id(),
            "starting embedding backfill"
        );

        for batch in pending.chunks(self.batch_size) {
            let mut ids = Vec::with_capacity(batch.len());
            let mut texts = Vec::with_capacity(batch.len());
            for id in batch {
                match index.get_chunk(*id)? {
                    Some(chunk) => {
                        ids.push(chunk.id);
                        texts.push(chunk.text);
                    }
                    None => report.skipped += 1,
                }
            }
            if texts.is_empty() {
                continue;
            }

            let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
            let vectors = self
                .provider
                .embed_batch(&text_refs)
                .context("embedding batch failed")?;
            ensure!(
                vectors.len() == ids.len(),
                "provider returned {} vectors for {} texts",
                vectors.len(),
                ids.len()
            );

            for (id, vector) in ids.iter().zip(&vectors) {
                if index.store_embedding(*id, vector)? {
                    report.embedded += 1;
                } else {
                    report.skipped += 1;
                }
            }
            tracing::debug!(batch = ids.len(), embedded = report.embedded, "embedded batch");
        }

        tracing::info!(
            embedded = report.embedded,
            skipped = report.skipped,
            "embedding backfill complete"
        );
        Ok(report)
    }

    /// Embed one stored chunk and validate the result.
    fn check_provider(&self, index: &MemoryIndex) -> Result<()> {
        let Some(file) = index.indexed_files()?.into_iter().next() else {
            return Ok(());
        };
        let Some(sample) = index.chunks_for_file(&file)?.into_iter().next() else {
            return Ok(());
        };
        let vector = self.provider.embed(&sample.text)?;
        validate_vector(&vector)?;
        Ok(())
    }
}
