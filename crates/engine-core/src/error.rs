use connectors::{error::AdapterError, sql::base::error::DbError};
use model::pagination::cursor::Cursor;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tokenizer::TokenizerError;

/// Everything that can end a run. None of these are retried.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Database connection failed: {0}")]
    ConnectionFailure(#[source] AdapterError),

    #[error("Failed to read rows at {cursor}: {source}")]
    ReadFailure {
        cursor: Cursor,
        #[source]
        source: DbError,
    },

    #[error("Tokenization failed: {0}")]
    TokenizationFailure(#[source] TokenizerError),

    #[error("Tokenization service returned {actual} tokens for {expected} values")]
    ResponseLengthMismatch { expected: usize, actual: usize },

    #[error("Failed to write {batch_id}: {source}")]
    WriteFailure {
        batch_id: String,
        #[source]
        source: DbError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    ConfigInvalid,
    ConnectionFailure,
    ReadFailure,
    TokenizationFailure,
    ResponseLengthMismatch,
    WriteFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConfigInvalid => "ConfigInvalid",
            ErrorKind::ConnectionFailure => "ConnectionFailure",
            ErrorKind::ReadFailure => "ReadFailure",
            ErrorKind::TokenizationFailure => "TokenizationFailure",
            ErrorKind::ResponseLengthMismatch => "ResponseLengthMismatch",
            ErrorKind::WriteFailure => "WriteFailure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MigrationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MigrationError::ConfigInvalid(_) => ErrorKind::ConfigInvalid,
            MigrationError::ConnectionFailure(_) => ErrorKind::ConnectionFailure,
            MigrationError::ReadFailure { .. } => ErrorKind::ReadFailure,
            MigrationError::TokenizationFailure(_) => ErrorKind::TokenizationFailure,
            MigrationError::ResponseLengthMismatch { .. } => ErrorKind::ResponseLengthMismatch,
            MigrationError::WriteFailure { .. } => ErrorKind::WriteFailure,
        }
    }
}

/// A length mismatch keeps its own kind; every other client error is a
/// tokenization failure.
impl From<TokenizerError> for MigrationError {
    fn from(err: TokenizerError) -> Self {
        match err {
            TokenizerError::ResponseLengthMismatch { expected, actual } => {
                MigrationError::ResponseLengthMismatch { expected, actual }
            }
            other => MigrationError::TokenizationFailure(other),
        }
    }
}

impl From<AdapterError> for MigrationError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::UnsupportedFormat(format) => MigrationError::ConfigInvalid(format),
            other => MigrationError::ConnectionFailure(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenizer_errors_map_to_kinds() {
        let err: MigrationError = TokenizerError::ResponseLengthMismatch {
            expected: 2,
            actual: 1,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::ResponseLengthMismatch);

        let err: MigrationError = TokenizerError::Status {
            status: 503,
            body: String::new(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::TokenizationFailure);
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_unsupported_format_is_config_error() {
        let err: MigrationError = AdapterError::UnsupportedFormat("oracle".into()).into();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }
}
