//! Core memory store struct combining embedding generation and persistence.

use std::path::Path;

use crate::config::Config;
use crate::embedding::{Embedder, OnnxEmbedder};
use crate::errors::Error;
use crate::sqlite::Database;

/// Collection used when the caller does not name one.
pub const DEFAULT_COLLECTION: &str = "memories";
/// SQLite file created inside the storage directory.
pub const DATABASE_FILE: &str = "memories.db";
/// Result count for [`MemoryStore::search_default`].
pub const DEFAULT_SEARCH_LIMIT: usize = 2;
/// Batch size for [`MemoryStore::delete_by_threshold_default`].
pub const DEFAULT_BATCH_SIZE: usize = 10;
/// Distance threshold used by the CLI when none is given.
pub const DEFAULT_SCORE_LIMIT: f64 = 0.5;

/// Vector memory store for one named collection.
///
/// Owns its SQLite handle and its embedder; there is no global state. The
/// handle is opened at construction and closed by [`MemoryStore::close`] or
/// on drop.
///
/// # Mutability Requirements
///
/// Methods that embed text or write (`insert`, `search`,
/// `delete_by_threshold`, `delete`) take `&mut self`: embedders keep
/// mutable inference state, and exclusive access serializes writers on
/// this handle.
pub struct MemoryStore<E> {
    pub(crate) db: Database,
    pub(crate) embedder: E,
    pub(crate) collection: String,
}

impl<E: Embedder> MemoryStore<E> {
    /// Open (creating if needed) `collection` under `storage_dir`.
    ///
    /// # Arguments
    ///
    /// * `storage_dir` - Directory holding the database file (created if it doesn't exist)
    /// * `collection` - Logical collection name
    /// * `embedder` - Embedding backend used for inserts and queries
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Storage path contains path traversal sequences (e.g., "../")
    /// - Collection name is empty
    /// - Directory cannot be created
    /// - Database cannot be opened
    pub fn open(storage_dir: &Path, collection: &str, embedder: E) -> Result<Self, Error> {
        use std::path::Component;

        // Path traversal guard: reject parent directory components (works on all platforms)
        if storage_dir
            .components()
            .any(|component| matches!(component, Component::ParentDir))
        {
            return Err(Error::Config(
                "Invalid storage path: contains '..' which may escape the intended directory"
                    .to_string(),
            ));
        }

        if collection.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "Collection name cannot be empty".to_string(),
            ));
        }

        std::fs::create_dir_all(storage_dir)?;

        let db = Database::open(&storage_dir.join(DATABASE_FILE))?;
        db.ensure_collection(collection)?;

        tracing::info!(
            storage_dir = %storage_dir.display(),
            collection,
            "opened memory collection"
        );

        Ok(MemoryStore {
            db,
            embedder,
            collection: collection.to_string(),
        })
    }

    /// Name of the collection this store reads and writes.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Close the underlying database handle.
    ///
    /// # Errors
    ///
    /// Returns error if SQLite fails to finalize the connection.
    pub fn close(self) -> Result<(), Error> {
        self.db.close()?;
        tracing::debug!(collection = %self.collection, "closed memory collection");
        Ok(())
    }
}

impl MemoryStore<OnnxEmbedder> {
    /// Open the configured collection with the configured ONNX model.
    ///
    /// # Errors
    ///
    /// Returns error if the model cannot be loaded or the store cannot be opened.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let embedder = OnnxEmbedder::new(&config.embedding_model)?;
        Self::open(&config.storage_dir, &config.collection, embedder)
    }
}

/// Validate a result limit or batch size before any I/O.
///
/// Only 0 is rejected; values past the collection size are legal.
pub(crate) fn validate_limit(name: &str, limit: usize) -> Result<(), Error> {
    if limit == 0 {
        return Err(Error::InvalidArgument(format!(
            "{name} must be greater than 0"
        )));
    }
    Ok(())
}
