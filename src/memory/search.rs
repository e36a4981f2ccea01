//! Nearest-neighbour search and threshold deletion.

use crate::embedding::Embedder;
use crate::errors::Error;
use crate::memory_types::SearchHit;

use super::store::{DEFAULT_BATCH_SIZE, DEFAULT_SEARCH_LIMIT, MemoryStore, validate_limit};

/// Outcome of one threshold deletion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PurgeReport {
    /// Records removed across all rounds.
    pub deleted: usize,
    /// Nearest-neighbour queries issued, including the final empty one.
    pub rounds: usize,
}

impl<E: Embedder> MemoryStore<E> {
    #[must_use = "handle the error or results may be lost"]
    /// Search memories by semantic similarity.
    ///
    /// Embeds the query once and returns the `limit` closest memories.
    ///
    /// # Arguments
    ///
    /// * `query` - Search text; may be empty, the embedder decides what that means
    /// * `limit` - Maximum number of results, at least 1
    ///
    /// # Returns
    ///
    /// Hits sorted by ascending cosine distance (closest first), ties in
    /// insertion order. A collection smaller than `limit` returns all of its
    /// records.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Limit is 0 (before any I/O)
    /// - Embedding generation fails
    /// - Database operations fail
    pub fn search(&mut self, query: &str, limit: usize) -> Result<Vec<SearchHit>, Error> {
        validate_limit("limit", limit)?;

        let embedding = self.embedder.embed_one(query)?;
        let hits = self.db.query_nearest(&self.collection, &embedding, limit)?;

        tracing::debug!(collection = %self.collection, limit, returned = hits.len(), "searched memories");
        Ok(hits)
    }

    #[must_use = "handle the error or results may be lost"]
    /// [`search`](Self::search) with `DEFAULT_SEARCH_LIMIT` results.
    pub fn search_default(&mut self, query: &str) -> Result<Vec<SearchHit>, Error> {
        self.search(query, DEFAULT_SEARCH_LIMIT)
    }

    #[must_use = "handle the error or the deleted count may be lost"]
    /// Delete every memory whose distance to `query` is below `score_limit`.
    ///
    /// Works in rounds of at most `batch_size` records: fetch the closest
    /// `batch_size` memories, delete those under the threshold as one atomic
    /// batch, and repeat while full batches keep qualifying. Stops when a
    /// round selects nothing or deletes fewer than `batch_size` records.
    /// Results are strictly distance-ordered, so a short round means nothing
    /// further down the ranking qualifies.
    ///
    /// The query is embedded once per call.
    ///
    /// # Returns
    ///
    /// Total number of memories deleted; `0` when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - `batch_size` is 0 or `score_limit` is NaN (before any I/O)
    /// - Embedding generation fails (nothing deleted)
    /// - A query or delete fails; rounds committed before the failure stay deleted
    pub fn delete_by_threshold(
        &mut self,
        query: &str,
        score_limit: f64,
        batch_size: usize,
    ) -> Result<usize, Error> {
        Ok(self.purge(query, score_limit, batch_size)?.deleted)
    }

    #[must_use = "handle the error or the deleted count may be lost"]
    /// [`delete_by_threshold`](Self::delete_by_threshold) with `DEFAULT_BATCH_SIZE`.
    pub fn delete_by_threshold_default(
        &mut self,
        query: &str,
        score_limit: f64,
    ) -> Result<usize, Error> {
        self.delete_by_threshold(query, score_limit, DEFAULT_BATCH_SIZE)
    }

    pub(crate) fn purge(
        &mut self,
        query: &str,
        score_limit: f64,
        batch_size: usize,
    ) -> Result<PurgeReport, Error> {
        validate_limit("batch_size", batch_size)?;
        if score_limit.is_nan() {
            return Err(Error::InvalidArgument(
                "score_limit must be a number".to_string(),
            ));
        }

        let embedding = self.embedder.embed_one(query)?;
        let mut report = PurgeReport::default();

        loop {
            report.rounds += 1;
            let batch = self
                .db
                .query_nearest(&self.collection, &embedding, batch_size)?;

            let ids: Vec<String> = batch
                .into_iter()
                .filter(|hit| hit.distance < score_limit)
                .map(|hit| hit.id)
                .collect();
            if ids.is_empty() {
                break;
            }

            let removed = self.db.delete(&self.collection, &ids)?;
            report.deleted += removed;
            tracing::debug!(
                collection = %self.collection,
                round = report.rounds,
                removed,
                "threshold deletion round"
            );

            if removed < batch_size {
                break;
            }
        }

        tracing::info!(
            collection = %self.collection,
            score_limit,
            deleted = report.deleted,
            rounds = report.rounds,
            "threshold deletion finished"
        );
        Ok(report)
    }
}
