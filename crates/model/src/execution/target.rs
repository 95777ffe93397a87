use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("id column and target column must differ (both are '{0}')")]
    SameColumn(String),

    #[error("batch size must be at least 1")]
    ZeroBatchSize,
}

/// What a run rewrites: one column of one table, addressed by an id column.
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationTarget {
    table: String,
    id_column: String,
    target_column: String,
    batch_size: usize,
}

impl MigrationTarget {
    pub fn new(
        table: impl Into<String>,
        id_column: impl Into<String>,
        target_column: impl Into<String>,
        batch_size: usize,
    ) -> Result<Self, TargetError> {
        let table = table.into();
        let id_column = id_column.into();
        let target_column = target_column.into();

        if table.trim().is_empty() {
            return Err(TargetError::Empty("table"));
        }
        if id_column.trim().is_empty() {
            return Err(TargetError::Empty("id column"));
        }
        if target_column.trim().is_empty() {
            return Err(TargetError::Empty("target column"));
        }
        if id_column.eq_ignore_ascii_case(&target_column) {
            return Err(TargetError::SameColumn(id_column));
        }
        if batch_size == 0 {
            return Err(TargetError::ZeroBatchSize);
        }

        Ok(MigrationTarget {
            table,
            id_column,
            target_column,
            batch_size,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}
