use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::job::GRANULARITY_DEFAULT;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file does not exist.
    #[error("config file not found: {0}")]
    FileNotFound(String),

    /// Configuration could not be parsed.
    #[error("failed to parse config: {0}")]
    ParseError(String),

    /// Configuration parsed but carries an invalid value.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub transformer: TransformerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Checks the loaded values for nonsense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transformer.max_concurrent_jobs == 0 {
            return Err(ConfigError::Invalid(
                "transformer.max_concurrent_jobs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Worker configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransformerConfig {
    /// Upper bound on jobs running concurrently.
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
    /// Default progress reporting granularity for jobs that do not override
    /// it.
    #[serde(default = "default_progress_granularity")]
    pub progress_granularity: u32,
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
            progress_granularity: default_progress_granularity(),
        }
    }
}

fn default_max_concurrent_jobs() -> usize {
    2
}

fn default_progress_granularity() -> u32 {
    GRANULARITY_DEFAULT
}

/// Storage precondition configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Headroom subtracted from the measured available space before the
    /// precondition is evaluated.
    #[serde(default)]
    pub reserve_bytes: u64,
}
