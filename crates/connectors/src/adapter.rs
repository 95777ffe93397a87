use crate::{
    error::AdapterError,
    sql::{
        base::{
            adapter::{DatabaseKind, SqlAdapter},
            error::ConnectorError,
        },
        mssql::adapter::MsSqlAdapter,
        mysql::adapter::MySqlAdapter,
        postgres::adapter::PgAdapter,
    },
};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub enum Adapter {
    MySql(MySqlAdapter),
    Postgres(PgAdapter),
    SqlServer(MsSqlAdapter),
}

impl Adapter {
    /// Opens a connection for `kind` and checks it answers a ping.
    pub async fn connect(kind: DatabaseKind, conn_str: &str) -> Result<Self, AdapterError> {
        let adapter = match kind {
            DatabaseKind::MySql => Adapter::MySql(MySqlAdapter::connect(conn_str).await?),
            DatabaseKind::Postgres => Adapter::Postgres(PgAdapter::connect(conn_str).await?),
            DatabaseKind::SqlServer => Adapter::SqlServer(MsSqlAdapter::connect(conn_str).await?),
        };

        adapter
            .get_sql()
            .ping()
            .await
            .map_err(ConnectorError::Ping)?;
        info!(kind = %kind, "Database connection established");

        Ok(adapter)
    }

    /// Like [`Adapter::connect`], with the kind given by name.
    pub async fn from_format(format: &str, conn_str: &str) -> Result<Self, AdapterError> {
        let kind = format
            .parse::<DatabaseKind>()
            .map_err(AdapterError::UnsupportedFormat)?;
        Self::connect(kind, conn_str).await
    }

    pub fn get_sql(&self) -> &(dyn SqlAdapter + Send + Sync) {
        match self {
            Adapter::MySql(adapter) => adapter,
            Adapter::Postgres(adapter) => adapter,
            Adapter::SqlServer(adapter) => adapter,
        }
    }

    pub fn into_shared(self) -> Arc<dyn SqlAdapter> {
        match self {
            Adapter::MySql(adapter) => Arc::new(adapter),
            Adapter::Postgres(adapter) => Arc::new(adapter),
            Adapter::SqlServer(adapter) => Arc::new(adapter),
        }
    }
}
