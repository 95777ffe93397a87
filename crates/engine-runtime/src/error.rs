use engine_core::{error::MigrationError, report::RunReport};
use thiserror::Error;

/// A run that reached `Failed`: the error that stopped it and what had been
/// committed up to that point.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct FailedRun {
    #[source]
    pub error: MigrationError,
    pub report: RunReport,
}
