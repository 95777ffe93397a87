//! Consumers of [`MigrationEvent`]s.

use model::events::{Event, MigrationEvent};
use tracing::{error, info, warn};

/// Receives every event a run emits, in order.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: &MigrationEvent);
}

/// Renders progress as log lines.
#[derive(Debug, Default, Clone)]
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn emit(&self, event: &MigrationEvent) {
        let pct = event
            .percentage()
            .map(|p| format!("{p:.1}%"))
            .unwrap_or_else(|| "n/a".into());

        match event {
            MigrationEvent::Started(e) => info!(
                event = event.event_type(),
                run_id = %e.run_id,
                table = %e.table,
                total = e.total_count,
                cursor = %e.cursor,
                "Migration started"
            ),
            MigrationEvent::BatchCommitted(e) => info!(
                event = event.event_type(),
                batch = %e.batch_id,
                processed = e.rows_processed,
                total = e.total_count,
                progress = %pct,
                "Progress: {}/{} rows",
                e.rows_processed,
                e.total_count
            ),
            MigrationEvent::RowSkipped(e) => warn!(
                event = event.event_type(),
                batch = %e.batch_id,
                row_id = e.row_id,
                error = %e.error,
                "Row skipped"
            ),
            MigrationEvent::Completed(e) => info!(
                event = event.event_type(),
                processed = e.rows_processed,
                total = e.total_count,
                elapsed_ms = e.elapsed_ms as u64,
                "Migration completed"
            ),
            MigrationEvent::Failed(e) => error!(
                event = event.event_type(),
                kind = %e.error_kind,
                processed = e.rows_processed,
                resume_offset = e.cursor.offset,
                error = %e.error,
                "Migration failed"
            ),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn emit(&self, _event: &MigrationEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{
        core::identifiers::RunId,
        events::{MigrationFailed, RowSkipped},
        pagination::cursor::Cursor,
    };
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_tracing_sink_logs_skipped_row_id() {
        TracingProgressSink.emit(&MigrationEvent::RowSkipped(RowSkipped {
            run_id: RunId::from("run"),
            batch_id: "batch-000001".into(),
            row_id: 42,
            error: "status 500".into(),
            rows_processed: 0,
            total_count: 2,
            timestamp: chrono::Utc::now(),
        }));

        assert!(logs_contain("Row skipped"));
        assert!(logs_contain("row_id=42"));
    }

    #[traced_test]
    #[test]
    fn test_tracing_sink_logs_resume_offset_on_failure() {
        TracingProgressSink.emit(&MigrationEvent::Failed(MigrationFailed {
            run_id: RunId::from("run"),
            error: "boom".into(),
            error_kind: "WriteFailure".into(),
            rows_processed: 100,
            total_count: 120,
            cursor: Cursor::new(100),
            timestamp: chrono::Utc::now(),
        }));

        assert!(logs_contain("Migration failed"));
        assert!(logs_contain("resume_offset=100"));
    }
}
