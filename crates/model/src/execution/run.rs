use crate::{core::identifiers::RunId, pagination::cursor::Cursor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, time::Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Running,
    Completed,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Running => "Running",
            RunState::Completed => "Completed",
            RunState::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunState::Running)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bookkeeping for one invocation. Lives only as long as the run; a failed
/// run starts over from its configured start offset.
#[derive(Debug, Clone)]
pub struct MigrationRun {
    run_id: RunId,
    started_at: DateTime<Utc>,
    started: Instant,
    state: RunState,
    cursor: Cursor,
    rows_processed: u64,
    rows_skipped: u64,
    batches: u64,
}

impl MigrationRun {
    pub fn new(run_id: RunId, start: Cursor) -> Self {
        MigrationRun {
            run_id,
            started_at: Utc::now(),
            started: Instant::now(),
            state: RunState::Running,
            cursor: start,
            rows_processed: 0,
            rows_skipped: 0,
            batches: 0,
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Rows whose token was committed during this run.
    pub fn rows_processed(&self) -> u64 {
        self.rows_processed
    }

    pub fn rows_skipped(&self) -> u64 {
        self.rows_skipped
    }

    pub fn batches(&self) -> u64 {
        self.batches
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.started.elapsed()
    }

    /// Records a committed batch. `rows_read` moves the cursor, `rows_written`
    /// and `rows_skipped` feed the counters.
    pub fn record_batch(&mut self, rows_read: usize, rows_written: u64, rows_skipped: u64) {
        if self.state.is_terminal() {
            return;
        }
        self.cursor = self.cursor.advance(rows_read);
        self.rows_processed += rows_written;
        self.rows_skipped += rows_skipped;
        self.batches += 1;
    }

    /// Running -> Completed. Returns false if the run already ended.
    pub fn complete(&mut self) -> bool {
        self.transition(RunState::Completed)
    }

    /// Running -> Failed. Returns false if the run already ended.
    pub fn fail(&mut self) -> bool {
        self.transition(RunState::Failed)
    }

    fn transition(&mut self, to: RunState) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = to;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_batch_advances_by_rows_read() {
        let mut run = MigrationRun::new(RunId::from("r"), Cursor::start());
        run.record_batch(50, 50, 0);
        run.record_batch(20, 18, 2);

        assert_eq!(run.cursor(), Cursor::new(70));
        assert_eq!(run.rows_processed(), 68);
        assert_eq!(run.rows_skipped(), 2);
        assert_eq!(run.batches(), 2);
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut run = MigrationRun::new(RunId::from("r"), Cursor::start());
        assert!(run.fail());
        assert!(!run.complete());
        assert_eq!(run.state(), RunState::Failed);

        run.record_batch(10, 10, 0);
        assert_eq!(run.rows_processed(), 0);
    }
}
