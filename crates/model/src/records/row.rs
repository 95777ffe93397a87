use serde::{Deserialize, Serialize};

/// One row read from the source table: its identifier and the plaintext
/// value of the target column.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRow {
    pub id: i64,
    pub raw_value: String,
}

impl SourceRow {
    pub fn new(id: i64, raw_value: impl Into<String>) -> Self {
        SourceRow {
            id,
            raw_value: raw_value.into(),
        }
    }
}

// The raw value is a card number; keep it out of logs.
impl std::fmt::Debug for SourceRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRow")
            .field("id", &self.id)
            .field("raw_value", &"<redacted>")
            .finish()
    }
}
