//! Insert and point operations for the memory store.

use uuid::Uuid;

use crate::embedding::{Embedder, EmbeddingError};
use crate::errors::Error;
use crate::memory_types::MemoryRecord;

use super::store::{MemoryStore, validate_limit};

impl<E: Embedder> MemoryStore<E> {
    #[must_use = "handle the error or the ids may be lost"]
    /// Insert a batch of texts, returning one new id per text in input order.
    ///
    /// Every text becomes a distinct record, duplicates included. The whole
    /// batch is embedded with a single `embed_many` call and written in one
    /// transaction.
    ///
    /// # Returns
    ///
    /// Ids with the same length and order as `texts`: `ids[i]` is the record
    /// for `texts[i]`. An empty input returns an empty vector without
    /// touching the embedder or the database.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The embedder fails or returns the wrong number of vectors
    /// - The database rejects the batch
    ///
    /// Nothing is persisted when an error is returned.
    pub fn insert<S: AsRef<str>>(&mut self, texts: &[S]) -> Result<Vec<String>, Error> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = texts.iter().map(|t| t.as_ref().to_string()).collect();

        let ids: Vec<String> = texts.iter().map(|_| Uuid::new_v4().to_string()).collect();

        let embeddings = self.embedder.embed_many(&texts)?;
        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: embeddings.len(),
            }
            .into());
        }

        self.db.add(&self.collection, &ids, &embeddings, &texts)?;

        tracing::debug!(collection = %self.collection, count = ids.len(), "inserted memories");
        Ok(ids)
    }

    #[must_use = "handle the error or results may be lost"]
    /// Get a specific memory by ID.
    ///
    /// Returns `None` if the memory doesn't exist in this collection.
    pub fn get(&self, id: &str) -> Result<Option<MemoryRecord>, Error> {
        Ok(self.db.get(&self.collection, id)?)
    }

    #[must_use = "handle the error or results may be lost"]
    /// Delete memories by ID as one atomic batch.
    ///
    /// Unknown ids are skipped. Returns how many records were removed.
    pub fn delete<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<usize, Error> {
        let ids: Vec<String> = ids.iter().map(|id| id.as_ref().to_string()).collect();
        let removed = self.db.delete(&self.collection, &ids)?;
        tracing::debug!(collection = %self.collection, requested = ids.len(), removed, "deleted memories");
        Ok(removed)
    }

    #[must_use = "handle the error or results may be lost"]
    /// Number of memories in the collection.
    pub fn count(&self) -> Result<usize, Error> {
        Ok(self.db.count(&self.collection)?)
    }

    #[must_use = "handle the error or results may be lost"]
    /// List memories, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if limit is 0.
    pub fn list(&self, limit: usize) -> Result<Vec<MemoryRecord>, Error> {
        validate_limit("limit", limit)?;
        Ok(self.db.list(&self.collection, limit)?)
    }
}
