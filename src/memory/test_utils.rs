//! Test embedder with hand-picked vectors and failure injection.

use std::collections::HashMap;

use tempfile::TempDir;

use crate::embedding::{Embedder, EmbeddingError};

use super::MemoryStore;

/// Returns the vector registered for a text, or `fallback` otherwise.
pub struct StubEmbedder {
    table: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
    pub fail: bool,
    /// Vectors dropped from the end of every `embed_many` answer.
    pub drop_from_batch: usize,
    pub one_calls: usize,
    pub many_calls: usize,
}

impl StubEmbedder {
    pub fn new(fallback: Vec<f32>) -> Self {
        Self {
            table: HashMap::new(),
            fallback,
            fail: false,
            drop_from_batch: 0,
            one_calls: 0,
            many_calls: 0,
        }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.table.insert(text.to_string(), vector);
        self
    }

    fn lookup(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if self.fail {
            return Err(EmbeddingError::Provider("stub failure".to_string()));
        }
        Ok(self
            .table
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

impl Embedder for StubEmbedder {
    fn embed_one(&mut self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.one_calls += 1;
        self.lookup(text)
    }

    fn embed_many(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.many_calls += 1;
        let mut vectors = texts
            .iter()
            .map(|t| self.lookup(t))
            .collect::<Result<Vec<_>, _>>()?;
        let keep = vectors.len().saturating_sub(self.drop_from_batch);
        vectors.truncate(keep);
        Ok(vectors)
    }
}

/// Open a store in a fresh temporary directory. Keep the `TempDir` alive.
pub fn stub_store(embedder: StubEmbedder) -> (TempDir, MemoryStore<StubEmbedder>) {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::open(dir.path(), "test", embedder).unwrap();
    (dir, store)
}
