//! Configuration validation logic.

use crate::errors::Error;

use super::Config;

/// Validates configuration values.
pub struct ConfigValidator<'a> {
    pub config: &'a Config,
}

impl ConfigValidator<'_> {
    /// Validate all configuration values for correctness and constraints.
    ///
    /// Checks that:
    /// - Storage directory, collection and embedding model are not empty
    /// - Search limit and batch size are at least 1
    /// - Score limit is a finite number
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if any validation check fails.
    pub fn validate(&self) -> Result<(), Error> {
        self.validate_storage_dir()?;
        self.validate_names()?;
        self.validate_size("search_limit", self.config.search_limit)?;
        self.validate_size("batch_size", self.config.batch_size)?;
        self.validate_score_limit()?;

        Ok(())
    }

    fn validate_storage_dir(&self) -> Result<(), Error> {
        if self.config.storage_dir.as_os_str().is_empty() {
            return Err(Error::Config("Storage directory cannot be empty".to_string()));
        }

        Ok(())
    }

    fn validate_names(&self) -> Result<(), Error> {
        if self.config.collection.trim().is_empty() {
            return Err(Error::Config("Collection name cannot be empty".to_string()));
        }
        if self.config.embedding_model.trim().is_empty() {
            return Err(Error::Config("Embedding model cannot be empty".to_string()));
        }

        Ok(())
    }

    fn validate_size(&self, name: &str, value: usize) -> Result<(), Error> {
        if value == 0 {
            return Err(Error::Config(format!(
                "Invalid {name}: {value} (must be at least 1)"
            )));
        }

        Ok(())
    }

    fn validate_score_limit(&self) -> Result<(), Error> {
        if !self.config.score_limit.is_finite() {
            return Err(Error::Config(
                "Invalid score limit: NaN and infinity are not allowed".into(),
            ));
        }

        Ok(())
    }
}
