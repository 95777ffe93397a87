//! Reader and writer for the table being tokenized, on top of any adapter.

use crate::sql::base::{
    adapter::SqlAdapter, destination::DbDataDestination, error::DbError, source::DbDataSource,
};
use async_trait::async_trait;
use model::{
    execution::target::MigrationTarget,
    pagination::{cursor::Cursor, page::FetchResult},
    records::pair::TokenizedPair,
};
use planner::query::generator::QueryGenerator;
use std::{sync::Arc, time::Instant};
use tracing::debug;

#[derive(Clone)]
pub struct TableSource {
    adapter: Arc<dyn SqlAdapter>,
    target: MigrationTarget,
    queries: QueryGenerator,
}

impl TableSource {
    pub fn new(adapter: Arc<dyn SqlAdapter>, target: MigrationTarget) -> Self {
        let queries = QueryGenerator::new(adapter.dialect());
        Self {
            adapter,
            target,
            queries,
        }
    }
}

#[async_trait]
impl DbDataSource for TableSource {
    async fn count(&self) -> Result<u64, DbError> {
        let stmt = self.queries.count(self.target.table())?;
        debug!(sql = %stmt.sql, "Counting rows");
        self.adapter.count_rows(&stmt).await
    }

    async fn fetch(&self, cursor: Cursor, batch_size: usize) -> Result<FetchResult, DbError> {
        let start = Instant::now();
        let stmt = self
            .queries
            .select_page(&self.target, cursor.offset, batch_size)?;
        debug!(sql = %stmt.sql, params = ?stmt.params, "Fetching page");

        let rows = self.adapter.fetch_rows(&stmt).await?;
        if rows.len() > batch_size {
            return Err(DbError::Decode(format!(
                "page query returned {} rows for a limit of {batch_size}",
                rows.len()
            )));
        }

        Ok(FetchResult::new(rows, cursor, start.elapsed().as_millis()))
    }
}

#[derive(Clone)]
pub struct TableDestination {
    adapter: Arc<dyn SqlAdapter>,
    update_sql: String,
}

impl TableDestination {
    pub fn new(adapter: Arc<dyn SqlAdapter>, target: &MigrationTarget) -> Result<Self, DbError> {
        let update_sql = QueryGenerator::new(adapter.dialect())
            .update_target(target)?
            .sql;
        Ok(Self {
            adapter,
            update_sql,
        })
    }

    pub fn update_sql(&self) -> &str {
        &self.update_sql
    }
}

#[async_trait]
impl DbDataDestination for TableDestination {
    async fn write_batch(&self, pairs: &[TokenizedPair]) -> Result<u64, DbError> {
        if pairs.is_empty() {
            return Ok(0);
        }
        self.adapter.update_in_tx(&self.update_sql, pairs).await
    }
}
