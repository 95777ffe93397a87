use crate::sql::base::error::{ConnectorError, DbError};
use async_trait::async_trait;
use model::records::{pair::TokenizedPair, row::SourceRow};
use planner::query::{
    dialect::{self, Dialect},
    renderer::Statement,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    Postgres,
    MySql,
    SqlServer,
}

impl DatabaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseKind::Postgres => "postgres",
            DatabaseKind::MySql => "mysql",
            DatabaseKind::SqlServer => "sqlserver",
        }
    }

    /// SQL flavour spoken by this kind of database.
    pub fn dialect(&self) -> Arc<dyn Dialect> {
        match self {
            DatabaseKind::Postgres => Arc::new(dialect::Postgres),
            DatabaseKind::MySql => Arc::new(dialect::MySql),
            DatabaseKind::SqlServer => Arc::new(dialect::SqlServer),
        }
    }
}

impl FromStr for DatabaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DatabaseKind::Postgres),
            "mysql" | "mariadb" => Ok(DatabaseKind::MySql),
            "mssql" | "sqlserver" => Ok(DatabaseKind::SqlServer),
            other => Err(format!("unsupported database type '{other}'")),
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The handful of database operations a tokenization run needs.
///
/// Every method takes SQL already rendered for [`SqlAdapter::dialect`].
#[async_trait]
pub trait SqlAdapter: Send + Sync {
    async fn connect(url: &str) -> Result<Self, ConnectorError>
    where
        Self: Sized;

    /// Round-trips `SELECT 1`.
    async fn ping(&self) -> Result<(), DbError>;

    async fn count_rows(&self, stmt: &Statement) -> Result<u64, DbError>;

    /// Runs a two-column `(id, value)` select. NULL values decode as `""`.
    async fn fetch_rows(&self, stmt: &Statement) -> Result<Vec<SourceRow>, DbError>;

    /// Prepares `sql` once and executes it for every pair with the token bound
    /// first and the id second, all inside one transaction. On any failure the
    /// transaction is rolled back before the error is returned.
    async fn update_in_tx(&self, sql: &str, pairs: &[TokenizedPair]) -> Result<u64, DbError>;

    fn kind(&self) -> DatabaseKind;

    fn dialect(&self) -> Arc<dyn Dialect>;
}
