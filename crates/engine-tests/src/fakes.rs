//! In-memory collaborators for driving the orchestrator without a database
//! or a tokenization service.

use async_trait::async_trait;
use connectors::sql::base::{destination::DbDataDestination, error::DbError, source::DbDataSource};
use engine_core::{options::RunOptions, progress::ProgressSink};
use engine_runtime::orchestrator::MigrationOrchestrator;
use model::{
    events::MigrationEvent,
    execution::target::MigrationTarget,
    pagination::{cursor::Cursor, page::FetchResult},
    records::{pair::TokenizedPair, row::SourceRow},
};
use std::{
    collections::{BTreeMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokenizer::{TokenizationClient, TokenizerError};

pub const TOKEN_PREFIX: &str = "TOK-";

/// A keyed table with transactional batch writes.
///
/// Writes are staged on a copy and swapped in only once every pair has been
/// applied, so a failing batch leaves the table exactly as it was.
#[derive(Default)]
pub struct InMemoryTable {
    rows: Mutex<BTreeMap<i64, String>>,
    fail_on: Option<i64>,
    pages: Mutex<Vec<usize>>,
    commits: Mutex<Vec<usize>>,
}

impl InMemoryTable {
    pub fn new<V: Into<String>>(rows: impl IntoIterator<Item = (i64, V)>) -> Self {
        Self {
            rows: Mutex::new(rows.into_iter().map(|(id, v)| (id, v.into())).collect()),
            ..Default::default()
        }
    }

    /// `n` rows with ids `1..=n` and sixteen-digit card-like values.
    pub fn with_rows(n: i64) -> Self {
        Self::new((1..=n).map(|id| (id, card_number(id))))
    }

    /// Makes every write that touches `id` fail.
    pub fn failing_on(mut self, id: i64) -> Self {
        self.fail_on = Some(id);
        self
    }

    pub fn get(&self, id: i64) -> Option<String> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<i64, String> {
        self.rows.lock().unwrap().clone()
    }

    /// Row counts of every page handed out, empty pages included.
    pub fn pages(&self) -> Vec<usize> {
        self.pages.lock().unwrap().clone()
    }

    /// Row counts of every committed batch.
    pub fn commits(&self) -> Vec<usize> {
        self.commits.lock().unwrap().clone()
    }

    pub fn tokenized_count(&self) -> usize {
        self.rows
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.starts_with(TOKEN_PREFIX))
            .count()
    }
}

#[async_trait]
impl DbDataSource for InMemoryTable {
    async fn count(&self) -> Result<u64, DbError> {
        Ok(self.rows.lock().unwrap().len() as u64)
    }

    async fn fetch(&self, cursor: Cursor, batch_size: usize) -> Result<FetchResult, DbError> {
        let rows: Vec<SourceRow> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .skip(cursor.offset as usize)
            .take(batch_size)
            .map(|(id, value)| SourceRow::new(*id, value.clone()))
            .collect();
        self.pages.lock().unwrap().push(rows.len());
        Ok(FetchResult::new(rows, cursor, 0))
    }
}

#[async_trait]
impl DbDataDestination for InMemoryTable {
    async fn write_batch(&self, pairs: &[TokenizedPair]) -> Result<u64, DbError> {
        let mut rows = self.rows.lock().unwrap();
        let mut staged = rows.clone();

        for pair in pairs {
            if self.fail_on == Some(pair.id) {
                return Err(DbError::Write(format!("update refused for id {}", pair.id)));
            }
            if let Some(value) = staged.get_mut(&pair.id) {
                *value = pair.token.clone();
            }
        }

        *rows = staged;
        self.commits.lock().unwrap().push(pairs.len());
        Ok(pairs.len() as u64)
    }
}

/// What a [`StubTokenizer`] answers.
#[derive(Debug, Clone)]
pub enum Script {
    /// `TOK-<value>`, leaving values that already carry the prefix alone.
    Prefix,
    /// The same token list for every batch call; single calls get the first.
    Fixed(Vec<String>),
    /// Every call fails with a 503.
    Unavailable,
    /// Prefix tokens with the last one dropped.
    Short,
}

pub struct StubTokenizer {
    script: Script,
    refuse: HashSet<String>,
    calls: AtomicUsize,
}

impl StubTokenizer {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            refuse: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn prefix() -> Self {
        Self::new(Script::Prefix)
    }

    /// Refuses `value` in single calls and fails any batch containing it.
    pub fn refusing(mut self, value: impl Into<String>) -> Self {
        self.refuse.insert(value.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn refused(value: &str) -> TokenizerError {
        TokenizerError::Status {
            status: 422,
            body: format!("invalid card number ending {}", last_four(value)),
        }
    }

    fn unavailable() -> TokenizerError {
        TokenizerError::Status {
            status: 503,
            body: "service unavailable".into(),
        }
    }
}

#[async_trait]
impl TokenizationClient for StubTokenizer {
    async fn tokenize_one(&self, value: &str) -> Result<String, TokenizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.refuse.contains(value) {
            return Err(Self::refused(value));
        }
        match &self.script {
            Script::Prefix | Script::Short => Ok(prefixed(value)),
            Script::Fixed(tokens) => tokens.first().cloned().ok_or_else(Self::unavailable),
            Script::Unavailable => Err(Self::unavailable()),
        }
    }

    async fn tokenize_many(&self, values: &[String]) -> Result<Vec<String>, TokenizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(value) = values.iter().find(|v| self.refuse.contains(*v)) {
            return Err(Self::refused(value));
        }
        match &self.script {
            Script::Prefix => Ok(values.iter().map(|v| prefixed(v)).collect()),
            Script::Fixed(tokens) => Ok(tokens.clone()),
            Script::Unavailable => Err(Self::unavailable()),
            Script::Short => {
                let mut tokens: Vec<String> = values.iter().map(|v| prefixed(v)).collect();
                tokens.pop();
                Ok(tokens)
            }
        }
    }
}

/// Keeps every event it receives.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<MigrationEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<MigrationEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: &MigrationEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn orchestrator(
    table: &Arc<InMemoryTable>,
    tokenizer: &Arc<StubTokenizer>,
    batch_size: usize,
    options: RunOptions,
) -> MigrationOrchestrator {
    let target = MigrationTarget::new("payments", "id", "cc_number", batch_size)
        .expect("valid target");
    MigrationOrchestrator::new(table.clone(), table.clone(), tokenizer.clone(), target)
        .with_options(options)
}

pub fn card_number(id: i64) -> String {
    format!("4{id:015}")
}

fn prefixed(value: &str) -> String {
    if value.starts_with(TOKEN_PREFIX) {
        value.to_string()
    } else {
        format!("{TOKEN_PREFIX}{value}")
    }
}

fn last_four(value: &str) -> &str {
    &value[value.len().saturating_sub(4)..]
}
