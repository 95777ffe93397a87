//! The summary a run leaves behind.

use crate::{error::ErrorKind, metrics::MetricsSnapshot};
use model::{
    core::identifiers::RunId,
    execution::run::{MigrationRun, RunState},
    pagination::cursor::Cursor,
};
use serde::Serialize;
use std::{fmt, fs::File, io::BufWriter, path::Path};

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub table: String,
    pub state: RunState,
    pub total_count: u64,
    pub rows_processed: u64,
    pub rows_skipped: u64,
    pub skipped_ids: Vec<i64>,
    pub batches: u64,
    /// Offset of the first row not committed. Pass it as the start offset of
    /// a later run to resume.
    pub cursor: Cursor,
    pub elapsed_ms: u128,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub error_kind: Option<ErrorKind>,
    pub error: Option<String>,
    pub metrics: MetricsSnapshot,
}

impl RunReport {
    pub fn from_run(
        run: &MigrationRun,
        table: &str,
        total_count: u64,
        skipped_ids: Vec<i64>,
        metrics: MetricsSnapshot,
    ) -> Self {
        RunReport {
            run_id: run.run_id().clone(),
            table: table.to_string(),
            state: run.state(),
            total_count,
            rows_processed: run.rows_processed(),
            rows_skipped: run.rows_skipped(),
            skipped_ids,
            batches: run.batches(),
            cursor: run.cursor(),
            elapsed_ms: run.elapsed().as_millis(),
            started_at: run.started_at(),
            error_kind: None,
            error: None,
            metrics,
        }
    }

    pub fn with_error(mut self, kind: ErrorKind, error: impl Into<String>) -> Self {
        self.error_kind = Some(kind);
        self.error = Some(error.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.state == RunState::Completed
    }

    pub fn write_json(&self, path: &Path) -> std::io::Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run {} on {}: {}", self.run_id, self.table, self.state)?;
        writeln!(
            f,
            "  rows processed: {} of {}",
            self.rows_processed, self.total_count
        )?;
        if self.rows_skipped > 0 {
            writeln!(f, "  rows skipped:   {}", self.rows_skipped)?;
        }
        writeln!(f, "  batches:        {}", self.batches)?;
        let elapsed_secs = self.elapsed_ms as f64 / 1000.0;
        writeln!(f, "  elapsed:        {elapsed_secs:.3}s")?;
        if let (Some(kind), Some(error)) = (&self.error_kind, &self.error) {
            writeln!(f, "  error:          {kind}: {error}")?;
            writeln!(f, "  resume offset:  {}", self.cursor.offset)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed_report() -> RunReport {
        let mut run = MigrationRun::new(RunId::from("run-1"), Cursor::start());
        run.record_batch(50, 50, 0);
        run.fail();
        RunReport::from_run(
            &run,
            "payments",
            120,
            Vec::new(),
            MetricsSnapshot::default(),
        )
        .with_error(ErrorKind::WriteFailure, "deadlock detected")
    }

    #[test]
    fn test_display_includes_resume_offset_on_failure() {
        let text = failed_report().to_string();
        assert!(text.contains("Failed"));
        assert!(text.contains("rows processed: 50 of 120"));
        assert!(text.contains("resume offset:  50"));
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        failed_report().write_json(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["state"], "Failed");
        assert_eq!(json["error_kind"], "WriteFailure");
        assert_eq!(json["cursor"]["offset"], 50);
        assert_eq!(json["rows_processed"], 50);
    }
}
