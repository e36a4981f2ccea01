//! Error types for mnemon.

use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::sqlite;

/// Main error type for mnemon operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The embedder could not produce vectors for the input batch.
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// The index/document store could not complete an add, query or delete.
    #[error("Storage error: {0}")]
    Storage(#[from] sqlite::Error),

    /// Rejected before any I/O.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Memory not found.
    #[error("Memory not found: {0}")]
    NotFound(String),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Storage(sqlite::Error::from(err))
    }
}
