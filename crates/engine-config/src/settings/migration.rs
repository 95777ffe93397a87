use crate::error::ConfigError;
use engine_core::options::{FailurePolicy, RunOptions, TokenizeMode};
use model::execution::target::MigrationTarget;
use planner::query::ident::{validate_identifier, validate_table_name};
use serde::Deserialize;

pub const DEFAULT_BATCH_SIZE: usize = 50;

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

#[derive(Debug, Clone, Deserialize)]
pub struct MigrationSettings {
    pub table: String,
    pub id_field: String,
    pub target_field: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub tokenize_mode: TokenizeMode,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default)]
    pub start_offset: u64,
}

impl MigrationSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_table_name(&self.table)
            .map_err(|e| ConfigError::Invalid(format!("migration.table: {e}")))?;
        validate_identifier(&self.id_field)
            .map_err(|e| ConfigError::Invalid(format!("migration.id_field: {e}")))?;
        validate_identifier(&self.target_field)
            .map_err(|e| ConfigError::Invalid(format!("migration.target_field: {e}")))?;
        self.target().map(|_| ())
    }

    pub fn target(&self) -> Result<MigrationTarget, ConfigError> {
        MigrationTarget::new(
            self.table.clone(),
            self.id_field.clone(),
            self.target_field.clone(),
            self.batch_size,
        )
        .map_err(|e| ConfigError::Invalid(format!("migration: {e}")))
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            tokenize_mode: self.tokenize_mode,
            failure_policy: self.failure_policy,
            start_offset: self.start_offset,
        }
    }
}
