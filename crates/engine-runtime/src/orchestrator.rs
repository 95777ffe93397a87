//! Drives read -> tokenize -> write until the table is exhausted or a batch
//! fails.

use crate::error::FailedRun;
use connectors::sql::base::{destination::DbDataDestination, source::DbDataSource};
use engine_core::{
    error::{ErrorKind, MigrationError},
    metrics::Metrics,
    options::{RunOptions, TokenizeMode},
    progress::{NoopProgressSink, ProgressSink},
    report::RunReport,
};
use model::{
    core::identifiers::RunId,
    events::{
        BatchCommitted, MigrationCompleted, MigrationEvent, MigrationFailed, MigrationRunStarted,
        RowSkipped,
    },
    execution::{run::MigrationRun, target::MigrationTarget},
    records::{
        batch::Batch,
        pair::{TokenizedPair, pair_tokens},
    },
};
use std::sync::Arc;
use tokenizer::TokenizationClient;
use tracing::{debug, error, info, warn};

/// A row the tokenization service refused, left unchanged in skip mode.
#[derive(Debug, Clone)]
struct SkippedRow {
    id: i64,
    error: String,
}

struct TokenizedBatch {
    pairs: Vec<TokenizedPair>,
    skipped: Vec<SkippedRow>,
}

pub struct MigrationOrchestrator {
    source: Arc<dyn DbDataSource>,
    destination: Arc<dyn DbDataDestination>,
    tokenizer: Arc<dyn TokenizationClient>,
    progress: Arc<dyn ProgressSink>,
    target: MigrationTarget,
    options: RunOptions,
    metrics: Metrics,
    run_id: RunId,
}

impl MigrationOrchestrator {
    pub fn new(
        source: Arc<dyn DbDataSource>,
        destination: Arc<dyn DbDataDestination>,
        tokenizer: Arc<dyn TokenizationClient>,
        target: MigrationTarget,
    ) -> Self {
        Self {
            source,
            destination,
            tokenizer,
            progress: Arc::new(NoopProgressSink),
            target,
            options: RunOptions::default(),
            metrics: Metrics::new(),
            run_id: RunId::generate(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn target(&self) -> &MigrationTarget {
        &self.target
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Runs to `Completed` or `Failed`. Either way the report carries the rows
    /// committed and the cursor of the first uncommitted row.
    pub async fn run(&self) -> Result<RunReport, FailedRun> {
        let mut run = MigrationRun::new(self.run_id.clone(), self.options.start_cursor());
        let mut skipped_ids = Vec::new();

        info!(
            run_id = %self.run_id,
            table = self.target.table(),
            batch_size = self.target.batch_size(),
            mode = %self.options.tokenize_mode,
            policy = %self.options.failure_policy,
            start = %run.cursor(),
            "Starting tokenization run"
        );

        let total_count = match self.source.count().await {
            Ok(total) => total,
            Err(source) => {
                let err = MigrationError::ReadFailure {
                    cursor: run.cursor(),
                    source,
                };
                return Err(self.fail(&mut run, 0, skipped_ids, err));
            }
        };

        self.progress
            .emit(&MigrationEvent::Started(MigrationRunStarted {
                run_id: self.run_id.clone(),
                table: self.target.table().to_string(),
                total_count,
                cursor: run.cursor(),
                timestamp: chrono::Utc::now(),
            }));

        let mut seq = 0;
        loop {
            let cursor = run.cursor();
            let fetched = match self.source.fetch(cursor, self.target.batch_size()).await {
                Ok(fetched) => fetched,
                Err(source) => {
                    let err = MigrationError::ReadFailure { cursor, source };
                    return Err(self.fail(&mut run, total_count, skipped_ids, err));
                }
            };

            if fetched.reached_end() {
                debug!(%cursor, "Empty page, no rows left");
                break;
            }

            seq += 1;
            let took_ms = fetched.took_ms as u64;
            let batch = Batch::from_fetch(seq, fetched);
            debug!(
                batch = %batch.id,
                %cursor,
                rows = batch.len(),
                first_id = batch.first_id(),
                last_id = batch.last_id(),
                took_ms,
                "Page read"
            );

            let (written, skipped) = match self
                .process_batch(&run, &batch, total_count, &mut skipped_ids)
                .await
            {
                Ok(outcome) => outcome,
                Err(err) => return Err(self.fail(&mut run, total_count, skipped_ids, err)),
            };

            run.record_batch(batch.len(), written, skipped);
            self.metrics.increment_rows(written);
            self.metrics.increment_batches(1);

            info!(
                run_id = %self.run_id,
                batch = %batch.id,
                rows = batch.len(),
                written,
                skipped,
                cursor = %run.cursor(),
                processed = run.rows_processed(),
                total = total_count,
                "Batch committed"
            );

            self.progress
                .emit(&MigrationEvent::BatchCommitted(BatchCommitted {
                    run_id: self.run_id.clone(),
                    batch_id: batch.id.to_string(),
                    row_count: written,
                    rows_processed: run.rows_processed(),
                    total_count,
                    cursor: run.cursor(),
                    timestamp: chrono::Utc::now(),
                }));
        }

        run.complete();
        let report = RunReport::from_run(
            &run,
            self.target.table(),
            total_count,
            skipped_ids,
            self.metrics.snapshot(),
        );

        info!(
            run_id = %self.run_id,
            processed = report.rows_processed,
            skipped = report.rows_skipped,
            batches = report.batches,
            elapsed_ms = report.elapsed_ms as u64,
            "Tokenization run completed"
        );

        self.progress
            .emit(&MigrationEvent::Completed(MigrationCompleted {
                run_id: self.run_id.clone(),
                rows_processed: report.rows_processed,
                total_count,
                cursor: report.cursor,
                elapsed_ms: report.elapsed_ms,
                timestamp: chrono::Utc::now(),
            }));

        Ok(report)
    }

    /// Tokenizes and writes one batch. Returns `(rows written, rows skipped)`.
    async fn process_batch(
        &self,
        run: &MigrationRun,
        batch: &Batch,
        total_count: u64,
        skipped_ids: &mut Vec<i64>,
    ) -> Result<(u64, u64), MigrationError> {
        let TokenizedBatch { pairs, skipped } = self.tokenize(batch).await?;

        for row in &skipped {
            warn!(
                run_id = %self.run_id,
                batch = %batch.id,
                row_id = row.id,
                error = %row.error,
                "Skipping row, tokenization failed"
            );
            self.metrics.increment_skipped(1);
            skipped_ids.push(row.id);
            self.progress.emit(&MigrationEvent::RowSkipped(RowSkipped {
                run_id: self.run_id.clone(),
                batch_id: batch.id.to_string(),
                row_id: row.id,
                error: row.error.clone(),
                rows_processed: run.rows_processed(),
                total_count,
                timestamp: chrono::Utc::now(),
            }));
        }

        if pairs.is_empty() {
            return Ok((0, skipped.len() as u64));
        }

        let written = self
            .destination
            .write_batch(&pairs)
            .await
            .map_err(|source| MigrationError::WriteFailure {
                batch_id: batch.id.to_string(),
                source,
            })?;

        for pair in &pairs {
            debug!(batch = %batch.id, row_id = pair.id, "Row updated");
        }

        Ok((written, skipped.len() as u64))
    }

    async fn tokenize(&self, batch: &Batch) -> Result<TokenizedBatch, MigrationError> {
        match self.options.tokenize_mode {
            TokenizeMode::PerRow => self.tokenize_per_row(batch).await,
            TokenizeMode::Batch => {
                self.metrics.increment_tokenize_calls(1);
                match self.tokenizer.tokenize_many(&batch.values()).await {
                    Ok(tokens) => {
                        let pairs = pair_tokens(&batch.rows, tokens).map_err(|m| {
                            MigrationError::ResponseLengthMismatch {
                                expected: m.expected,
                                actual: m.actual,
                            }
                        })?;
                        Ok(TokenizedBatch {
                            pairs,
                            skipped: Vec::new(),
                        })
                    }
                    Err(err) => {
                        let err = MigrationError::from(err);
                        if self.options.skips_failed_rows()
                            && err.kind() == ErrorKind::TokenizationFailure
                        {
                            warn!(
                                batch = %batch.id,
                                error = %err,
                                "Batch tokenization failed, retrying row by row"
                            );
                            self.tokenize_per_row(batch).await
                        } else {
                            Err(err)
                        }
                    }
                }
            }
        }
    }

    async fn tokenize_per_row(&self, batch: &Batch) -> Result<TokenizedBatch, MigrationError> {
        let mut pairs = Vec::with_capacity(batch.len());
        let mut skipped = Vec::new();

        for row in &batch.rows {
            self.metrics.increment_tokenize_calls(1);
            match self.tokenizer.tokenize_one(&row.raw_value).await {
                Ok(token) => pairs.push(TokenizedPair::new(row.id, token)),
                Err(err) if self.options.skips_failed_rows() => skipped.push(SkippedRow {
                    id: row.id,
                    error: err.to_string(),
                }),
                Err(err) => return Err(err.into()),
            }
        }

        Ok(TokenizedBatch { pairs, skipped })
    }

    fn fail(
        &self,
        run: &mut MigrationRun,
        total_count: u64,
        skipped_ids: Vec<i64>,
        error: MigrationError,
    ) -> FailedRun {
        run.fail();
        self.metrics.increment_failures(1);

        error!(
            run_id = %self.run_id,
            kind = %error.kind(),
            processed = run.rows_processed(),
            resume_offset = run.cursor().offset,
            error = %error,
            "Tokenization run failed"
        );

        self.progress.emit(&MigrationEvent::Failed(MigrationFailed {
            run_id: self.run_id.clone(),
            error: error.to_string(),
            error_kind: error.kind().to_string(),
            rows_processed: run.rows_processed(),
            total_count,
            cursor: run.cursor(),
            timestamp: chrono::Utc::now(),
        }));

        let report = RunReport::from_run(
            run,
            self.target.table(),
            total_count,
            skipped_ids,
            self.metrics.snapshot(),
        )
        .with_error(error.kind(), error.to_string());

        FailedRun { error, report }
    }
}
