//! Progress events emitted by the migration engine.
//!
//! Every event carries `rows_processed` and `total_count` so a sink can render
//! progress from any single event without keeping state of its own.

use crate::{core::identifiers::RunId, pagination::cursor::Cursor};
use serde::Serialize;
use std::fmt::Debug;

/// A trait for events that can be handed to a progress sink.
pub trait Event: Send + Sync + Debug + 'static {
    /// Returns a unique identifier for this event type.
    fn event_type(&self) -> &'static str;
}

/// Emitted once the row count is known, before the first batch is read.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationRunStarted {
    pub run_id: RunId,
    pub table: String,
    pub total_count: u64,
    pub cursor: Cursor,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Event for MigrationRunStarted {
    fn event_type(&self) -> &'static str {
        "migration.started"
    }
}

/// Emitted after a batch transaction has committed.
#[derive(Debug, Clone, Serialize)]
pub struct BatchCommitted {
    pub run_id: RunId,
    pub batch_id: String,
    pub row_count: u64,
    pub rows_processed: u64,
    pub total_count: u64,
    pub cursor: Cursor,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Event for BatchCommitted {
    fn event_type(&self) -> &'static str {
        "batch.committed"
    }
}

/// Emitted for every row left untouched in skip-and-continue mode.
#[derive(Debug, Clone, Serialize)]
pub struct RowSkipped {
    pub run_id: RunId,
    pub batch_id: String,
    pub row_id: i64,
    pub error: String,
    pub rows_processed: u64,
    pub total_count: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Event for RowSkipped {
    fn event_type(&self) -> &'static str {
        "row.skipped"
    }
}

/// Emitted when a migration run completes successfully.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationCompleted {
    pub run_id: RunId,
    pub rows_processed: u64,
    pub total_count: u64,
    pub cursor: Cursor,
    pub elapsed_ms: u128,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Event for MigrationCompleted {
    fn event_type(&self) -> &'static str {
        "migration.completed"
    }
}

/// Emitted when a migration run fails. `cursor` is the offset of the first
/// row that was not committed.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationFailed {
    pub run_id: RunId,
    pub error: String,
    pub error_kind: String,
    pub rows_processed: u64,
    pub total_count: u64,
    pub cursor: Cursor,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Event for MigrationFailed {
    fn event_type(&self) -> &'static str {
        "migration.failed"
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MigrationEvent {
    Started(MigrationRunStarted),
    BatchCommitted(BatchCommitted),
    RowSkipped(RowSkipped),
    Completed(MigrationCompleted),
    Failed(MigrationFailed),
}

impl MigrationEvent {
    pub fn rows_processed(&self) -> u64 {
        match self {
            MigrationEvent::Started(_) => 0,
            MigrationEvent::BatchCommitted(e) => e.rows_processed,
            MigrationEvent::RowSkipped(e) => e.rows_processed,
            MigrationEvent::Completed(e) => e.rows_processed,
            MigrationEvent::Failed(e) => e.rows_processed,
        }
    }

    pub fn total_count(&self) -> u64 {
        match self {
            MigrationEvent::Started(e) => e.total_count,
            MigrationEvent::BatchCommitted(e) => e.total_count,
            MigrationEvent::RowSkipped(e) => e.total_count,
            MigrationEvent::Completed(e) => e.total_count,
            MigrationEvent::Failed(e) => e.total_count,
        }
    }

    pub fn row_id(&self) -> Option<i64> {
        match self {
            MigrationEvent::RowSkipped(e) => Some(e.row_id),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            MigrationEvent::RowSkipped(e) => Some(&e.error),
            MigrationEvent::Failed(e) => Some(&e.error),
            _ => None,
        }
    }

    /// Completion ratio in percent, when the total is known and non-zero.
    pub fn percentage(&self) -> Option<f64> {
        let total = self.total_count();
        if total == 0 {
            return None;
        }
        let pct = self.rows_processed() as f64 / total as f64 * 100.0;
        Some(pct.min(100.0))
    }
}

impl Event for MigrationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            MigrationEvent::Started(e) => e.event_type(),
            MigrationEvent::BatchCommitted(e) => e.event_type(),
            MigrationEvent::RowSkipped(e) => e.event_type(),
            MigrationEvent::Completed(e) => e.event_type(),
            MigrationEvent::Failed(e) => e.event_type(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn committed(rows_processed: u64, total_count: u64) -> MigrationEvent {
        MigrationEvent::BatchCommitted(BatchCommitted {
            run_id: RunId::from("run"),
            batch_id: "batch-000001".into(),
            row_count: 50,
            rows_processed,
            total_count,
            cursor: Cursor::new(rows_processed),
            timestamp: chrono::Utc::now(),
        })
    }

    #[test]
    fn test_percentage() {
        assert_eq!(committed(50, 200).percentage(), Some(25.0));
        assert_eq!(committed(0, 0).percentage(), None);
    }

    #[test]
    fn test_event_type_delegates() {
        assert_eq!(committed(1, 1).event_type(), "batch.committed");
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let json = serde_json::to_value(committed(10, 20)).unwrap();
        assert_eq!(json["type"], "batch_committed");
        assert_eq!(json["rows_processed"], 10);
        assert_eq!(json["cursor"]["offset"], 10);
    }
}
