use crate::{pagination::cursor::Cursor, records::row::SourceRow};

/// Result of reading one window of the source table.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub rows: Vec<SourceRow>,
    /// Cursor the window was read at.
    pub cursor: Cursor,
    /// Cursor for the following window.
    pub next_cursor: Cursor,
    pub row_count: usize,
    pub took_ms: u128,
}

impl FetchResult {
    pub fn new(rows: Vec<SourceRow>, cursor: Cursor, took_ms: u128) -> Self {
        let row_count = rows.len();
        FetchResult {
            next_cursor: cursor.advance(row_count),
            rows,
            cursor,
            row_count,
            took_ms,
        }
    }

    /// An empty window is the end of the data.
    pub fn reached_end(&self) -> bool {
        self.row_count == 0
    }
}
