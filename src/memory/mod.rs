//! Core memory store orchestrating embedding and SQLite operations.
//!
//! Provides a high-level API for inserting, searching and pruning memories
//! with embedding generation delegated to an [`Embedder`](crate::Embedder).

mod crud;
mod search;

// pub(crate): module internals hidden; public items re-exported explicitly via lib.rs
pub(crate) mod store;

pub use store::{
    DATABASE_FILE, DEFAULT_BATCH_SIZE, DEFAULT_COLLECTION, DEFAULT_SCORE_LIMIT,
    DEFAULT_SEARCH_LIMIT, MemoryStore,
};

#[cfg(test)]
mod test_utils;
