use crate::{
    core::identifiers::BatchId,
    pagination::{cursor::Cursor, page::FetchResult},
    records::row::SourceRow,
};

/// One window of source rows, processed as a single tokenization request
/// and a single write transaction.
#[derive(Debug, Clone)]
pub struct Batch {
    pub id: BatchId,
    pub rows: Vec<SourceRow>, // id ascending
    pub cursor: Cursor,       // cursor the window was read at
    pub next: Cursor,         // cursor after this window
    pub ts: chrono::DateTime<chrono::Utc>,
}

impl Batch {
    pub fn from_fetch(seq: u64, fetched: FetchResult) -> Self {
        Batch {
            id: BatchId::from_seq(seq),
            rows: fetched.rows,
            cursor: fetched.cursor,
            next: fetched.next_cursor,
            ts: chrono::Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Raw values in row order.
    pub fn values(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.raw_value.clone()).collect()
    }

    pub fn first_id(&self) -> Option<i64> {
        self.rows.first().map(|r| r.id)
    }

    pub fn last_id(&self) -> Option<i64> {
        self.rows.last().map(|r| r.id)
    }
}
