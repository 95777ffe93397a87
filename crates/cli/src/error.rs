use connectors::error::AdapterError;
use engine_config::error::ConfigError;
use engine_core::error::MigrationError;
use planner::error::QueryError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Migration setup failed: {0}")]
    Migration(#[from] MigrationError),

    #[error("Connection test failed: {0}")]
    Connection(#[from] AdapterError),

    #[error("Failed to render SQL: {0}")]
    Query(#[from] QueryError),

    #[error("Failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write report to {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}
