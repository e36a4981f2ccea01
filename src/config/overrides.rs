//! Environment variable overrides for configuration.

use crate::errors::Error;

use super::Config;
use super::env_parser::{apply_override, parse_env_number, parse_env_path, parse_env_string};

pub const STORAGE_DIR_VAR: &str = "MNEMON_STORAGE_DIR";
pub const COLLECTION_VAR: &str = "MNEMON_COLLECTION";
pub const EMBEDDING_MODEL_VAR: &str = "MNEMON_EMBEDDING_MODEL";
pub const SEARCH_LIMIT_VAR: &str = "MNEMON_SEARCH_LIMIT";
pub const SCORE_LIMIT_VAR: &str = "MNEMON_SCORE_LIMIT";
pub const BATCH_SIZE_VAR: &str = "MNEMON_BATCH_SIZE";

/// Apply environment variable overrides to configuration.
pub fn apply_env_overrides(config: &mut Config) -> Result<(), Error> {
    apply_override(STORAGE_DIR_VAR, &mut config.storage_dir, parse_env_path)?;
    apply_override(COLLECTION_VAR, &mut config.collection, parse_env_string)?;
    apply_override(EMBEDDING_MODEL_VAR, &mut config.embedding_model, parse_env_string)?;
    apply_override(SEARCH_LIMIT_VAR, &mut config.search_limit, parse_env_number::<usize>)?;
    apply_override(SCORE_LIMIT_VAR, &mut config.score_limit, parse_env_number::<f64>)?;
    apply_override(BATCH_SIZE_VAR, &mut config.batch_size, parse_env_number::<usize>)?;
    Ok(())
}
