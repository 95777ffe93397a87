use serde::{Deserialize, Serialize};
use std::fmt;

/// Row-offset bookmark into the source table.
///
/// The offset only ever grows, and it grows by the number of rows a fetch
/// actually returned. Advancing by the configured batch size instead would
/// skip rows whenever a window comes back short.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub offset: u64,
}

impl Cursor {
    pub fn new(offset: u64) -> Self {
        Cursor { offset }
    }

    pub fn start() -> Self {
        Cursor::default()
    }

    /// Returns the cursor positioned after `rows_read` more rows.
    pub fn advance(self, rows_read: usize) -> Self {
        Cursor {
            offset: self.offset.saturating_add(rows_read as u64),
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offset={}", self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::Cursor;

    #[test]
    fn test_advance_by_rows_read() {
        let cursor = Cursor::start().advance(50).advance(50).advance(20);
        assert_eq!(cursor.offset, 120);
    }

    #[test]
    fn test_advance_by_zero_keeps_position() {
        let cursor = Cursor::new(40);
        assert_eq!(cursor.advance(0), cursor);
    }

    #[test]
    fn test_display() {
        assert_eq!(Cursor::new(7).to_string(), "offset=7");
    }
}
