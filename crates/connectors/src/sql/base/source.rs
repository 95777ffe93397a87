use crate::sql::base::error::DbError;
use async_trait::async_trait;
use model::{
    pagination::{cursor::Cursor, page::FetchResult},
    records::row::SourceRow,
};

/// Pages through the source table in id order.
#[async_trait]
pub trait DbDataSource: Send + Sync {
    /// Number of rows in the table, queried once before the first page.
    async fn count(&self) -> Result<u64, DbError>;

    /// Reads up to `batch_size` rows, skipping `cursor.offset` rows. An empty
    /// result marks the end of the data.
    async fn fetch(&self, cursor: Cursor, batch_size: usize) -> Result<FetchResult, DbError>;
}

/// Builds a row from a decoded target column. A NULL value holds no card
/// number and fails the read.
pub(crate) fn source_row(id: i64, value: Option<String>) -> Result<SourceRow, DbError> {
    match value {
        Some(raw_value) => Ok(SourceRow::new(id, raw_value)),
        None => Err(DbError::Decode(format!(
            "target column of row {id} is NULL"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_row_keeps_value() {
        let row = source_row(7, Some("4111111111111111".into())).unwrap();
        assert_eq!(row.id, 7);
        assert_eq!(row.raw_value, "4111111111111111");
    }

    #[test]
    fn test_source_row_keeps_empty_string() {
        assert_eq!(source_row(1, Some(String::new())).unwrap().raw_value, "");
    }

    #[test]
    fn test_null_target_is_a_decode_error() {
        let err = source_row(2, None).unwrap_err();
        assert!(matches!(err, DbError::Decode(_)));
        assert_eq!(
            err.to_string(),
            "Row decode error: target column of row 2 is NULL"
        );
    }
}
