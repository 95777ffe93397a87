//! The YAML configuration file: where the cards live, how to reach the
//! tokenization service, and how the run should behave.

use crate::{env::EnvManager, error::ConfigError};
use engine_core::options::RunOptions;
use model::execution::target::MigrationTarget;
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::debug;

pub mod database;
pub mod migration;
pub mod tokenization;

pub use database::DatabaseSettings;
pub use migration::MigrationSettings;
pub use tokenization::TokenizationSettings;

/// Immutable, validated configuration for one run.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub tokenization: TokenizationSettings,
    pub database: DatabaseSettings,
    pub migration: MigrationSettings,
}

impl Settings {
    /// Reads `path`, substitutes `${VAR}` references from `env`, parses and
    /// validates the result.
    pub fn load(path: impl AsRef<Path>, env: &EnvManager) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded configuration file");

        Self::from_yaml_str(&raw, env)
    }

    pub fn from_yaml_str(raw: &str, env: &EnvManager) -> Result<Self, ConfigError> {
        let expanded = env.expand(raw)?;
        let settings: Settings = serde_yaml::from_str(&expanded)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tokenization.validate()?;
        self.database.validate()?;
        self.migration.validate()
    }

    pub fn target(&self) -> Result<MigrationTarget, ConfigError> {
        self.migration.target()
    }

    pub fn run_options(&self) -> RunOptions {
        self.migration.run_options()
    }
}
