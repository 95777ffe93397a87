use engine_core::error::MigrationError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid env file: {0}")]
    EnvFile(String),

    #[error("Environment variable '{0}' is referenced but not set")]
    MissingVar(String),

    #[error("{0}")]
    Invalid(String),
}

impl From<ConfigError> for MigrationError {
    fn from(err: ConfigError) -> Self {
        MigrationError::ConfigInvalid(err.to_string())
    }
}
