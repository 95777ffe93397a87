use crate::sql::base::{
    adapter::{DatabaseKind, SqlAdapter},
    error::{ConnectorError, DbError},
    source::source_row,
};
use async_trait::async_trait;
use model::records::{pair::TokenizedPair, row::SourceRow};
use planner::query::{dialect::Dialect, renderer::Statement};
use std::sync::Arc;
use tiberius::{Client, Config, Row, ToSql};
use tokio::{net::TcpStream, sync::Mutex};
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, warn};

type MsSqlClient = Client<Compat<TcpStream>>;

const BEGIN: &str = "BEGIN TRANSACTION";
const COMMIT: &str = "COMMIT TRANSACTION";
const ROLLBACK: &str = "IF @@TRANCOUNT > 0 ROLLBACK TRANSACTION";

/// SQL Server over TDS. One connection is shared; tiberius needs `&mut` for
/// every round trip, so it lives behind a mutex.
#[derive(Clone)]
pub struct MsSqlAdapter {
    client: Arc<Mutex<MsSqlClient>>,
}

fn int_params(values: &[i64]) -> Vec<&dyn ToSql> {
    values.iter().map(|v| v as &dyn ToSql).collect()
}

impl MsSqlAdapter {
    fn decode_row(row: &Row) -> Result<SourceRow, DbError> {
        let id = row
            .try_get::<i64, _>(0)
            .or_else(|_| row.try_get::<i32, _>(0).map(|v| v.map(i64::from)))
            .or_else(|_| row.try_get::<i16, _>(0).map(|v| v.map(i64::from)))
            .map_err(|e| DbError::Decode(format!("id column: {e}")))?
            .ok_or_else(|| DbError::Decode("id column is NULL".into()))?;
        let value = row
            .try_get::<&str, _>(1)
            .map_err(|e| DbError::Decode(format!("target column of row {id}: {e}")))?
            .map(str::to_owned);
        source_row(id, value)
    }

    async fn apply_pairs(
        client: &mut MsSqlClient,
        sql: &str,
        pairs: &[TokenizedPair],
    ) -> Result<u64, DbError> {
        for pair in pairs {
            let result = client.execute(sql, &[&pair.token, &pair.id]).await?;
            if result.total() == 0 {
                debug!(id = pair.id, "Update matched no row");
            }
        }
        Ok(pairs.len() as u64)
    }
}

/// Runs a transaction-control statement on an open connection.
#[async_trait]
trait TxControl: Send {
    async fn exec_batch(&mut self, sql: &str) -> Result<(), DbError>;
}

#[async_trait]
impl TxControl for MsSqlClient {
    async fn exec_batch(&mut self, sql: &str) -> Result<(), DbError> {
        self.simple_query(sql).await?.into_results().await?;
        Ok(())
    }
}

/// Commits after a successful apply. A failed apply or a failed commit is
/// rolled back before the error is returned.
async fn finish_tx<C: TxControl>(
    conn: &mut C,
    applied: Result<u64, DbError>,
) -> Result<u64, DbError> {
    let outcome = match applied {
        Ok(updated) => conn.exec_batch(COMMIT).await.map(|()| updated),
        Err(err) => Err(err),
    };

    match outcome {
        Ok(updated) => Ok(updated),
        Err(err) => {
            if let Err(rollback_err) = conn.exec_batch(ROLLBACK).await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

#[async_trait]
impl SqlAdapter for MsSqlAdapter {
    async fn connect(url: &str) -> Result<Self, ConnectorError> {
        let config =
            Config::from_ado_string(url).map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;

        let tcp = TcpStream::connect(config.get_addr()).await?;
        tcp.set_nodelay(true)?;

        let client = Client::connect(config, tcp.compat_write()).await?;
        Ok(MsSqlAdapter {
            client: Arc::new(Mutex::new(client)),
        })
    }

    async fn ping(&self) -> Result<(), DbError> {
        let mut client = self.client.lock().await;
        client.simple_query("SELECT 1").await?.into_results().await?;
        Ok(())
    }

    async fn count_rows(&self, stmt: &Statement) -> Result<u64, DbError> {
        let mut client = self.client.lock().await;
        let row = client
            .query(&stmt.sql, &int_params(&stmt.params))
            .await?
            .into_row()
            .await?
            .ok_or_else(|| DbError::Decode("count query returned no row".into()))?;

        let count = row
            .try_get::<i32, _>(0)
            .map(|v| v.map(i64::from))
            .or_else(|_| row.try_get::<i64, _>(0))?
            .unwrap_or(0);
        Ok(count.max(0) as u64)
    }

    async fn fetch_rows(&self, stmt: &Statement) -> Result<Vec<SourceRow>, DbError> {
        let mut client = self.client.lock().await;
        let rows = client
            .query(&stmt.sql, &int_params(&stmt.params))
            .await?
            .into_first_result()
            .await?;
        rows.iter().map(Self::decode_row).collect()
    }

    // tiberius has no transaction object; the statements are issued on the
    // locked connection so nothing else can interleave.
    async fn update_in_tx(&self, sql: &str, pairs: &[TokenizedPair]) -> Result<u64, DbError> {
        let mut client = self.client.lock().await;
        client.exec_batch(BEGIN).await?;

        let applied = Self::apply_pairs(&mut client, sql, pairs).await;
        finish_tx(&mut *client, applied).await
    }

    fn kind(&self) -> DatabaseKind {
        DatabaseKind::SqlServer
    }

    fn dialect(&self) -> Arc<dyn Dialect> {
        DatabaseKind::SqlServer.dialect()
    }
}
