use model::pagination::cursor::Cursor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How values are sent to the tokenization service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizeMode {
    /// One `tokenize_many` call per batch.
    #[default]
    Batch,
    /// One `tokenize_one` call per row.
    PerRow,
}

/// What happens when a row cannot be tokenized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The batch is abandoned uncommitted and the run fails.
    #[default]
    FailFast,
    /// The row is left unchanged, logged with its id, and the run goes on.
    /// Read and write errors still fail the run.
    SkipAndContinue,
}

impl fmt::Display for TokenizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizeMode::Batch => f.write_str("batch"),
            TokenizeMode::PerRow => f.write_str("per_row"),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::FailFast => f.write_str("fail_fast"),
            FailurePolicy::SkipAndContinue => f.write_str("skip_and_continue"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunOptions {
    pub tokenize_mode: TokenizeMode,
    pub failure_policy: FailurePolicy,
    /// Rows to skip before the first batch, for resuming a failed run by hand.
    pub start_offset: u64,
}

impl RunOptions {
    pub fn start_cursor(&self) -> Cursor {
        Cursor::new(self.start_offset)
    }

    pub fn skips_failed_rows(&self) -> bool {
        self.failure_policy == FailurePolicy::SkipAndContinue
    }
}
