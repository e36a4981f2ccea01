//! Shared test utilities for config module tests.

use std::sync::Mutex;

use super::overrides::{
    BATCH_SIZE_VAR, COLLECTION_VAR, EMBEDDING_MODEL_VAR, SCORE_LIMIT_VAR, SEARCH_LIMIT_VAR,
    STORAGE_DIR_VAR,
};

/// Mutex to serialize environment variable tests and prevent race conditions.
pub static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Every variable read by the override layer.
pub const ENV_VARS: [&str; 6] = [
    STORAGE_DIR_VAR,
    COLLECTION_VAR,
    EMBEDDING_MODEL_VAR,
    SEARCH_LIMIT_VAR,
    SCORE_LIMIT_VAR,
    BATCH_SIZE_VAR,
];

/// Clean up environment variables used by mnemon config.
pub fn cleanup_env_vars(vars: &[&str]) {
    for var in vars {
        // SAFETY: callers hold ENV_MUTEX, so no other test thread touches the environment.
        unsafe { std::env::remove_var(var) };
    }
}
