//! Configuration system for mnemon.

mod env_parser;
mod loader;
mod overrides;
mod paths;
mod validation;

#[cfg(test)]
mod tests_utils;

use crate::embedding::DEFAULT_MODEL_ID;
use crate::errors::Error;
use crate::memory::{DEFAULT_BATCH_SIZE, DEFAULT_COLLECTION, DEFAULT_SCORE_LIMIT, DEFAULT_SEARCH_LIMIT};
use std::path::{Path, PathBuf};

pub use loader::{ConfigFile, default_config_path};

/// Configuration values with priority: defaults < config file < env vars.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the collection database (created on first open).
    pub storage_dir: PathBuf,

    /// Logical collection name inside the database.
    pub collection: String,

    /// HuggingFace embedding model identifier.
    pub embedding_model: String,

    /// Default number of results for searches.
    pub search_limit: usize,

    /// Default distance below which threshold deletion removes a memory.
    pub score_limit: f64,

    /// Default batch size for threshold deletion.
    pub batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        // Use home directory with sensible fallback for systems without HOME
        let home = dirs::home_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
        });

        Self {
            storage_dir: home.join(".mnemon"),
            collection: DEFAULT_COLLECTION.to_string(),
            embedding_model: DEFAULT_MODEL_ID.to_string(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            score_limit: DEFAULT_SCORE_LIMIT,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Config {
    /// Load configuration from the default config file location plus
    /// environment overrides.
    pub fn load() -> Result<Self, Error> {
        Self::load_from(&default_config_path())
    }

    /// Load configuration from an explicit config file path plus environment
    /// overrides. A missing file is not an error.
    pub fn load_from(config_path: &Path) -> Result<Self, Error> {
        let mut config = Config::default();

        if let Some(file) = loader::load_from_path(config_path)? {
            config.merge_from_file(file);
        }

        overrides::apply_env_overrides(&mut config)?;

        config.validate()?;

        Ok(config)
    }

    /// Merge configuration from a file into this config.
    fn merge_from_file(&mut self, file: ConfigFile) {
        if let Some(mut storage_dir) = file.storage_dir {
            paths::expand_tilde(&mut storage_dir);
            self.storage_dir = storage_dir;
        }
        if let Some(collection) = file.collection {
            self.collection = collection;
        }
        if let Some(embedding_model) = file.embedding_model {
            self.embedding_model = embedding_model;
        }
        if let Some(search_limit) = file.search_limit {
            self.search_limit = search_limit;
        }
        if let Some(score_limit) = file.score_limit {
            self.score_limit = score_limit;
        }
        if let Some(batch_size) = file.batch_size {
            self.batch_size = batch_size;
        }
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), Error> {
        validation::ConfigValidator { config: self }.validate()
    }
}
