//! Turns loaded settings into a ready-to-run orchestrator.

use crate::orchestrator::MigrationOrchestrator;
use connectors::{
    adapter::Adapter,
    sql::base::{
        adapter::SqlAdapter,
        source::DbDataSource,
        table::{TableDestination, TableSource},
    },
};
use engine_config::settings::Settings;
use engine_core::{
    error::MigrationError,
    metrics::Metrics,
    options::RunOptions,
    progress::{ProgressSink, TracingProgressSink},
};
use std::sync::Arc;
use tokenizer::HttpTokenizer;
use tracing::info;

pub struct MigrationExecutor {
    settings: Settings,
    options: RunOptions,
    progress: Arc<dyn ProgressSink>,
    metrics: Metrics,
}

impl MigrationExecutor {
    pub fn new(settings: Settings) -> Self {
        let options = settings.run_options();
        Self {
            settings,
            options,
            progress: Arc::new(TracingProgressSink),
            metrics: Metrics::new(),
        }
    }

    /// Overrides the configured start offset.
    pub fn with_start_offset(mut self, offset: Option<u64>) -> Self {
        if let Some(offset) = offset {
            self.options.start_offset = offset;
        }
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Connects to the database, builds the tokenization client and wires
    /// both into an orchestrator. Nothing is read or written yet.
    pub async fn prepare(self) -> Result<MigrationOrchestrator, MigrationError> {
        let target = self.settings.target()?;
        let adapter = connect(&self.settings).await?;

        let source = TableSource::new(adapter.clone(), target.clone());
        let destination = TableDestination::new(adapter, &target)
            .map_err(|e| MigrationError::ConfigInvalid(e.to_string()))?;

        let tokenizer = HttpTokenizer::new(self.settings.tokenization.client_config())
            .map_err(|e| MigrationError::ConfigInvalid(e.to_string()))?;
        info!(
            url = tokenizer.batch_url(),
            group = %self.settings.tokenization.token_group,
            "Tokenization client ready"
        );

        Ok(
            MigrationOrchestrator::new(
                Arc::new(source),
                Arc::new(destination),
                Arc::new(tokenizer),
                target,
            )
            .with_options(self.options)
            .with_progress(self.progress)
            .with_metrics(self.metrics),
        )
    }
}

/// Opens and pings the configured database.
pub async fn connect(settings: &Settings) -> Result<Arc<dyn SqlAdapter>, MigrationError> {
    let kind = settings.database.kind()?;
    let url = settings.database.connection_url()?;
    let adapter = Adapter::connect(kind, &url).await?;
    Ok(adapter.into_shared())
}

/// Row count of the configured table.
pub async fn count_rows(settings: &Settings) -> Result<u64, MigrationError> {
    let target = settings.target()?;
    let adapter = connect(settings).await?;
    let source = TableSource::new(adapter, target);
    source
        .count()
        .await
        .map_err(|source| MigrationError::ReadFailure {
            cursor: Default::default(),
            source,
        })
}
