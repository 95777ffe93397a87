use crate::orchestrator::MigrationOrchestrator;
use async_trait::async_trait;
use connectors::sql::base::{destination::DbDataDestination, error::DbError, source::DbDataSource};
use engine_core::{
    error::ErrorKind,
    options::{FailurePolicy, RunOptions, TokenizeMode},
};
use model::{
    execution::{run::RunState, target::MigrationTarget},
    pagination::{cursor::Cursor, page::FetchResult},
    records::{pair::TokenizedPair, row::SourceRow},
};
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};
use tokenizer::{TokenizationClient, TokenizerError};

struct MockSource {
    rows: Vec<SourceRow>,
    fail_count: bool,
    fail_fetch_at: Option<u64>,
}

impl MockSource {
    fn new(n: i64) -> Self {
        Self {
            rows: (1..=n)
                .map(|i| SourceRow::new(i, format!("4{i:015}")))
                .collect(),
            fail_count: false,
            fail_fetch_at: None,
        }
    }
}

#[async_trait]
impl DbDataSource for MockSource {
    async fn count(&self) -> Result<u64, DbError> {
        if self.fail_count {
            return Err(DbError::Decode("count refused".into()));
        }
        Ok(self.rows.len() as u64)
    }

    async fn fetch(&self, cursor: Cursor, batch_size: usize) -> Result<FetchResult, DbError> {
        if self.fail_fetch_at == Some(cursor.offset) {
            return Err(DbError::Decode("connection reset".into()));
        }
        let rows = self
            .rows
            .iter()
            .skip(cursor.offset as usize)
            .take(batch_size)
            .cloned()
            .collect();
        Ok(FetchResult::new(rows, cursor, 0))
    }
}

#[derive(Default)]
struct MockDestination {
    batches: Mutex<Vec<Vec<TokenizedPair>>>,
}

impl MockDestination {
    fn written_ids(&self) -> Vec<i64> {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .map(|p| p.id)
            .collect()
    }
}

#[async_trait]
impl DbDataDestination for MockDestination {
    async fn write_batch(&self, pairs: &[TokenizedPair]) -> Result<u64, DbError> {
        self.batches.lock().unwrap().push(pairs.to_vec());
        Ok(pairs.len() as u64)
    }
}

/// Tokenizes by prefixing; refuses the listed values, and optionally every
/// batch call or returns one token short.
#[derive(Default)]
struct MockTokenizer {
    refuse: HashSet<String>,
    batch_fails: bool,
    short: bool,
}

#[async_trait]
impl TokenizationClient for MockTokenizer {
    async fn tokenize_one(&self, value: &str) -> Result<String, TokenizerError> {
        if self.refuse.contains(value) {
            return Err(TokenizerError::Status {
                status: 422,
                body: "rejected".into(),
            });
        }
        Ok(format!("TOK-{value}"))
    }

    async fn tokenize_many(&self, values: &[String]) -> Result<Vec<String>, TokenizerError> {
        if self.batch_fails {
            return Err(TokenizerError::Status {
                status: 500,
                body: String::new(),
            });
        }
        let mut tokens: Vec<String> = values.iter().map(|v| format!("TOK-{v}")).collect();
        if self.short {
            tokens.pop();
        }
        Ok(tokens)
    }
}

fn orchestrator(
    source: MockSource,
    destination: Arc<MockDestination>,
    tokenizer: MockTokenizer,
    batch_size: usize,
    options: RunOptions,
) -> MigrationOrchestrator {
    let target = MigrationTarget::new("payments", "id", "cc_number", batch_size).unwrap();
    MigrationOrchestrator::new(Arc::new(source), destination, Arc::new(tokenizer), target)
        .with_options(options)
}

fn value_of(id: i64) -> String {
    format!("4{id:015}")
}

#[tokio::test]
async fn test_count_failure_is_read_failure() {
    let mut source = MockSource::new(3);
    source.fail_count = true;
    let dest = Arc::new(MockDestination::default());

    let failed = orchestrator(
        source,
        dest.clone(),
        MockTokenizer::default(),
        2,
        RunOptions::default(),
    )
    .run()
    .await
    .unwrap_err();

    assert_eq!(failed.error.kind(), ErrorKind::ReadFailure);
    assert_eq!(failed.report.state, RunState::Failed);
    assert!(dest.written_ids().is_empty());
}

#[tokio::test]
async fn test_fetch_failure_reports_committed_rows_and_cursor() {
    let mut source = MockSource::new(5);
    source.fail_fetch_at = Some(4);
    let dest = Arc::new(MockDestination::default());

    let failed = orchestrator(
        source,
        dest.clone(),
        MockTokenizer::default(),
        2,
        RunOptions::default(),
    )
    .run()
    .await
    .unwrap_err();

    assert_eq!(failed.error.kind(), ErrorKind::ReadFailure);
    assert_eq!(failed.report.rows_processed, 4);
    assert_eq!(failed.report.cursor, Cursor::new(4));
    assert_eq!(dest.written_ids(), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_start_offset_skips_leading_rows() {
    let dest = Arc::new(MockDestination::default());
    let options = RunOptions {
        start_offset: 3,
        ..RunOptions::default()
    };

    let report = orchestrator(
        MockSource::new(5),
        dest.clone(),
        MockTokenizer::default(),
        2,
        options,
    )
    .run()
    .await
    .unwrap();

    assert_eq!(dest.written_ids(), vec![4, 5]);
    assert_eq!(report.rows_processed, 2);
    assert_eq!(report.cursor, Cursor::new(5));
}

#[tokio::test]
async fn test_per_row_fail_fast_writes_nothing_from_failing_batch() {
    let dest = Arc::new(MockDestination::default());
    let tokenizer = MockTokenizer {
        refuse: HashSet::from([value_of(4)]),
        ..Default::default()
    };
    let options = RunOptions {
        tokenize_mode: TokenizeMode::PerRow,
        ..RunOptions::default()
    };

    let failed = orchestrator(MockSource::new(5), dest.clone(), tokenizer, 2, options)
        .run()
        .await
        .unwrap_err();

    assert_eq!(failed.error.kind(), ErrorKind::TokenizationFailure);
    assert_eq!(dest.written_ids(), vec![1, 2]);
    assert_eq!(failed.report.cursor, Cursor::new(2));
}

#[tokio::test]
async fn test_per_row_skip_and_continue() {
    let dest = Arc::new(MockDestination::default());
    let tokenizer = MockTokenizer {
        refuse: HashSet::from([value_of(2)]),
        ..Default::default()
    };
    let options = RunOptions {
        tokenize_mode: TokenizeMode::PerRow,
        failure_policy: FailurePolicy::SkipAndContinue,
        start_offset: 0,
    };

    let report = orchestrator(MockSource::new(3), dest.clone(), tokenizer, 50, options)
        .run()
        .await
        .unwrap();

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(dest.written_ids(), vec![1, 3]);
    assert_eq!(report.rows_processed, 2);
    assert_eq!(report.rows_skipped, 1);
    assert_eq!(report.skipped_ids, vec![2]);
    assert_eq!(report.cursor, Cursor::new(3));
}

#[tokio::test]
async fn test_batch_failure_falls_back_to_rows_when_skipping() {
    let dest = Arc::new(MockDestination::default());
    let tokenizer = MockTokenizer {
        refuse: HashSet::from([value_of(1)]),
        batch_fails: true,
        ..Default::default()
    };
    let options = RunOptions {
        failure_policy: FailurePolicy::SkipAndContinue,
        ..RunOptions::default()
    };

    let report = orchestrator(MockSource::new(2), dest.clone(), tokenizer, 50, options)
        .run()
        .await
        .unwrap();

    assert_eq!(dest.written_ids(), vec![2]);
    assert_eq!(report.skipped_ids, vec![1]);
    assert_eq!(report.metrics.tokenize_calls, 3);
}

#[tokio::test]
async fn test_length_mismatch_is_fatal_even_when_skipping() {
    let dest = Arc::new(MockDestination::default());
    let tokenizer = MockTokenizer {
        short: true,
        ..Default::default()
    };
    let options = RunOptions {
        failure_policy: FailurePolicy::SkipAndContinue,
        ..RunOptions::default()
    };

    let failed = orchestrator(MockSource::new(2), dest.clone(), tokenizer, 50, options)
        .run()
        .await
        .unwrap_err();

    assert_eq!(failed.error.kind(), ErrorKind::ResponseLengthMismatch);
    assert!(dest.written_ids().is_empty());
}

#[tokio::test]
async fn test_batch_of_only_skipped_rows_is_not_written() {
    let dest = Arc::new(MockDestination::default());
    let tokenizer = MockTokenizer {
        refuse: HashSet::from([value_of(1), value_of(2)]),
        ..Default::default()
    };
    let options = RunOptions {
        tokenize_mode: TokenizeMode::PerRow,
        failure_policy: FailurePolicy::SkipAndContinue,
        start_offset: 0,
    };

    let report = orchestrator(MockSource::new(2), dest.clone(), tokenizer, 50, options)
        .run()
        .await
        .unwrap();

    assert!(dest.batches.lock().unwrap().is_empty());
    assert_eq!(report.rows_skipped, 2);
    assert_eq!(report.cursor, Cursor::new(2));
}
