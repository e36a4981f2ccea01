//! mnemon - Semantic memory for agents, backed by a local vector store.
//!
//! Texts are embedded on insert and kept in a named collection inside a
//! SQLite file. Queries return the closest memories by cosine distance, and
//! whole regions of the collection can be forgotten by threshold.
//! All operations are synchronous (no async/await required).
//!
//! # Example
//!
//! ```no_run
//! use mnemon::{Config, MemoryStore};
//!
//! let config = Config::load().expect("Failed to load config");
//! let mut store = MemoryStore::from_config(&config).expect("Failed to open store");
//!
//! let ids = store
//!     .insert(&["apple pie recipe", "car engine repair"])
//!     .expect("Failed to insert");
//! println!("Inserted {} memories", ids.len());
//!
//! for hit in store.search("apple dessert", 2).expect("Search failed") {
//!     println!("{:.3}: {}", hit.distance, hit.text);
//! }
//!
//! let forgotten = store
//!     .delete_by_threshold("apple dessert", 0.8, 10)
//!     .expect("Threshold deletion failed");
//! println!("Forgot {forgotten} memories");
//! ```
//!
//! # Embedders
//!
//! [`MemoryStore`] is generic over [`Embedder`]. [`OnnxEmbedder`] runs a
//! sentence-transformer model from HuggingFace; [`HashingEmbedder`] is a
//! deterministic bag-of-words embedder that needs no model download.
//!
//! # Mutability Requirements
//!
//! Methods that generate embeddings or write (`insert`, `search`,
//! `delete_by_threshold`, `delete`) require `&mut self` because embedders
//! keep mutable inference state.

pub mod config;
pub mod embedding;
pub mod errors;
pub mod memory;
pub mod memory_types;
mod sqlite;

// Re-export public API
pub use config::Config;
pub use embedding::{DEFAULT_MODEL_ID, Embedder, EmbeddingError, HashingEmbedder, OnnxEmbedder};
pub use errors::Error;
pub use memory::{
    DATABASE_FILE, DEFAULT_BATCH_SIZE, DEFAULT_COLLECTION, DEFAULT_SCORE_LIMIT,
    DEFAULT_SEARCH_LIMIT, MemoryStore,
};
pub use memory_types::{MemoryRecord, SearchHit};
pub use sqlite::Error as StorageError;
