use crate::error::CliError;
use connectors::adapter::Adapter;
use tracing::{error, info};

/// Connects with the adapter for `format` and runs its ping query. The
/// connection string is never logged since it usually carries a password.
pub async fn ping(format: &str, conn_str: &str) -> Result<(), CliError> {
    info!(format, "Pinging database");

    let adapter = Adapter::from_format(format, conn_str).await.map_err(|e| {
        error!(format, error = %e, "Ping failed");
        e
    })?;

    info!(kind = %adapter.get_sql().kind(), "Ping succeeded");
    Ok(())
}
