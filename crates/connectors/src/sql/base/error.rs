use planner::error::QueryError;
use std::error::Error as StdError;
use thiserror::Error;

/// All errors coming from the database/query layer.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Postgres error: {}", pg_diagnostic(.0))]
    Postgres(#[from] tokio_postgres::Error),

    #[error("MySQL error: {0}")]
    MySql(#[from] mysql_async::Error),

    #[error("SQL Server error: {0}")]
    SqlServer(#[from] tiberius::error::Error),

    /// An error occurred while building a SQL query.
    #[error("Query build error: {0}")]
    QueryBuild(#[from] QueryError),

    /// A row could not be turned into an `(id, value)` pair.
    #[error("Row decode error: {0}")]
    Decode(String),

    /// Writing rows to the database failed at the application level.
    #[error("Write error: {0}")]
    Write(String),
}

/// Errors happening during adapter or connection setup.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Invalid connection string: {0}")]
    InvalidUrl(String),

    #[error("Postgres connection failed: {}", pg_diagnostic(.0))]
    Postgres(#[from] tokio_postgres::Error),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("MySQL connection failed: {0}")]
    MySql(#[from] mysql_async::Error),

    #[error("SQL Server connection failed: {0}")]
    SqlServer(#[from] tiberius::error::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection opened but did not answer `SELECT 1`.
    #[error("Ping failed: {0}")]
    Ping(#[source] DbError),
}

/// `tokio_postgres::Error` displays as "db error"; the server's message
/// lives in the attached `DbError` or further down the source chain.
///
/// The server's DETAIL field is left out: it can quote row values.
fn pg_diagnostic(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => {
            let mut msg = format!("{} {}: {}", db.severity(), db.code().code(), db.message());
            if let Some(constraint) = db.constraint() {
                msg.push_str(&format!(" (constraint {constraint})"));
            }
            msg
        }
        None => with_sources(err),
    }
}

/// An error followed by each of its sources, joined with `": "`.
pub fn with_sources(err: &(dyn StdError + 'static)) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
