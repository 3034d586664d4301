#![allow(dead_code)]

use memdex::config::IndexSettings;
use memdex::embedding::EmbeddingProvider;
use memdex::MemoryIndex;

/// Open a fresh in-memory index with default settings.
pub fn test_index() -> MemoryIndex {
    MemoryIndex::open_in_memory(&IndexSettings::default()).unwrap()
}

/// Generate a deterministic 16-dim embedding with a spike at position `seed`.
/// Distinct seeds produce orthogonal vectors.
pub fn test_embedding(seed: u8) -> Vec<f32> {
    let mut v = vec![0.0f32; 16];
    v[seed as usize % 16] = 1.0;
    v
}

/// Index `content` under `file_path` and return the new chunk ids.
pub fn index(index: &mut MemoryIndex, file_path: &str, content: &str) -> Vec<i64> {
    index.index_file(file_path, content).unwrap().chunk_ids
}

/// Bag-of-words provider: one dimension per vocabulary word, counting hits.
/// Texts with no vocabulary word get a constant fallback so vectors are never zero.
pub struct FakeProvider {
    pub model: String,
    pub vocabulary: Vec<&'static str>,
}

impl FakeProvider {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            vocabulary: vec!["rust", "sqlite", "deploy", "coffee", "meeting"],
        }
    }
}

impl EmbeddingProvider for FakeProvider {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let lower = text.to_lowercase();
        let mut v: Vec<f32> = self
            .vocabulary
            .iter()
            .map(|word| lower.matches(word).count() as f32)
            .collect();
        v.push(0.1);
        Ok(v)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
