use crate::sql::{
    base::{
        adapter::{DatabaseKind, SqlAdapter},
        error::{ConnectorError, DbError},
        source::source_row,
    },
    mysql::params::MySqlParamStore,
};
use async_trait::async_trait;
use model::records::{pair::TokenizedPair, row::SourceRow};
use mysql_async::{Opts, Pool, Row, Transaction, TxOpts, prelude::Queryable};
use planner::query::{dialect::Dialect, renderer::Statement};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct MySqlAdapter {
    pool: Pool,
}

impl MySqlAdapter {
    fn decode_row(row: &Row) -> Result<SourceRow, DbError> {
        let id = match row.get_opt::<i64, usize>(0) {
            Some(Ok(id)) => id,
            Some(Err(e)) => return Err(DbError::Decode(format!("id column: {e}"))),
            None => return Err(DbError::Decode("id column missing".into())),
        };
        let value = match row.get_opt::<Option<String>, usize>(1) {
            Some(Ok(value)) => value,
            Some(Err(e)) => {
                return Err(DbError::Decode(format!(
                    "target column of row {id}: {e}"
                )));
            }
            None => return Err(DbError::Decode("target column missing".into())),
        };
        source_row(id, value)
    }

    async fn apply_pairs(
        tx: &mut Transaction<'_>,
        sql: &str,
        pairs: &[TokenizedPair],
    ) -> Result<u64, DbError> {
        let stmt = tx.prep(sql).await?;
        for pair in pairs {
            let bindings = MySqlParamStore::update(&pair.token, pair.id);
            tx.exec_drop(&stmt, bindings.params()).await?;
            if tx.affected_rows() == 0 {
                debug!(id = pair.id, "Update changed no row");
            }
        }
        Ok(pairs.len() as u64)
    }
}

#[async_trait]
impl SqlAdapter for MySqlAdapter {
    async fn connect(url: &str) -> Result<Self, ConnectorError> {
        let opts = Opts::from_url(url).map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;
        let pool = Pool::new(opts);
        // Pool::new is lazy; make sure the server is reachable now.
        let conn = pool.get_conn().await?;
        drop(conn);
        Ok(MySqlAdapter { pool })
    }

    async fn ping(&self) -> Result<(), DbError> {
        let mut conn = self.pool.get_conn().await?;
        conn.query_drop("SELECT 1").await?;
        Ok(())
    }

    async fn count_rows(&self, stmt: &Statement) -> Result<u64, DbError> {
        let mut conn = self.pool.get_conn().await?;
        let bindings = MySqlParamStore::from_ints(&stmt.params);
        let count: Option<i64> = conn.exec_first(stmt.sql.as_str(), bindings.params()).await?;
        Ok(count.unwrap_or(0).max(0) as u64)
    }

    async fn fetch_rows(&self, stmt: &Statement) -> Result<Vec<SourceRow>, DbError> {
        let mut conn = self.pool.get_conn().await?;
        let bindings = MySqlParamStore::from_ints(&stmt.params);
        let rows: Vec<Row> = conn.exec(stmt.sql.as_str(), bindings.params()).await?;
        rows.iter().map(Self::decode_row).collect()
    }

    async fn update_in_tx(&self, sql: &str, pairs: &[TokenizedPair]) -> Result<u64, DbError> {
        let mut conn = self.pool.get_conn().await?;
        let mut tx = conn.start_transaction(TxOpts::default()).await?;

        match Self::apply_pairs(&mut tx, sql, pairs).await {
            Ok(updated) => {
                tx.commit().await?;
                Ok(updated)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    fn kind(&self) -> DatabaseKind {
        DatabaseKind::MySql
    }

    fn dialect(&self) -> Arc<dyn Dialect> {
        DatabaseKind::MySql.dialect()
    }
}
