use crate::sql::base::error::ConnectorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    /// An unsupported database type was requested.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Failed to initialize a data connector/adapter.
    #[error("Connector error: {0}")]
    Connector(#[from] ConnectorError),
}
