use crate::sql::{
    base::{
        adapter::{DatabaseKind, SqlAdapter},
        error::{ConnectorError, DbError},
        source::source_row,
    },
    postgres::{
        params::{PgParam, PgParamStore},
        utils::connect_client,
    },
};
use async_trait::async_trait;
use model::records::{pair::TokenizedPair, row::SourceRow};
use planner::query::{dialect::Dialect, renderer::Statement};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_postgres::{Client, Row};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct PgAdapter {
    client: Arc<RwLock<Client>>,
}

impl PgAdapter {
    fn decode_row(row: &Row) -> Result<SourceRow, DbError> {
        let id = row
            .try_get::<_, i64>(0)
            .or_else(|_| row.try_get::<_, i32>(0).map(i64::from))
            .or_else(|_| row.try_get::<_, i16>(0).map(i64::from))
            .map_err(|e| DbError::Decode(format!("id column: {e}")))?;
        let value = row
            .try_get::<_, Option<String>>(1)
            .map_err(|e| DbError::Decode(format!("target column of row {id}: {e}")))?;
        source_row(id, value)
    }

    async fn apply_pairs(
        tx: &tokio_postgres::Transaction<'_>,
        sql: &str,
        pairs: &[TokenizedPair],
    ) -> Result<u64, DbError> {
        let stmt = tx.prepare(sql).await?;
        let id_type = stmt.params().get(1).cloned();

        for pair in pairs {
            let token = PgParam::text(&pair.token);
            let id = PgParam::id_for(id_type.as_ref(), pair.id)?;
            let updated = tx.execute(&stmt, &[token.as_ref(), id.as_ref()]).await?;
            if updated == 0 {
                debug!(id = pair.id, "Update matched no row");
            }
        }

        Ok(pairs.len() as u64)
    }
}

#[async_trait]
impl SqlAdapter for PgAdapter {
    async fn connect(url: &str) -> Result<Self, ConnectorError> {
        let client = Arc::new(RwLock::new(connect_client(url).await?));
        Ok(PgAdapter { client })
    }

    async fn ping(&self) -> Result<(), DbError> {
        let client = self.client.read().await;
        client.simple_query("SELECT 1").await?;
        Ok(())
    }

    async fn count_rows(&self, stmt: &Statement) -> Result<u64, DbError> {
        let bindings = PgParamStore::from_ints(&stmt.params);
        let client = self.client.read().await;
        let row = client.query_one(&stmt.sql, &bindings.as_refs()).await?;
        let count: i64 = row.try_get(0)?;
        Ok(count.max(0) as u64)
    }

    async fn fetch_rows(&self, stmt: &Statement) -> Result<Vec<SourceRow>, DbError> {
        let bindings = PgParamStore::from_ints(&stmt.params);
        let client = self.client.read().await;
        let rows = client.query(&stmt.sql, &bindings.as_refs()).await?;
        rows.iter().map(Self::decode_row).collect()
    }

    async fn update_in_tx(&self, sql: &str, pairs: &[TokenizedPair]) -> Result<u64, DbError> {
        let mut client = self.client.write().await;
        let tx = client.transaction().await?;

        match Self::apply_pairs(&tx, sql, pairs).await {
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
        DatabaseKind::Postgres
    }

    fn dialect(&self) -> Arc<dyn Dialect> {
        DatabaseKind::Postgres.dialect()
    }
}
