use tiberius::Client;
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

use crate::config::ConnectionSettings;
use crate::error::ConnectorError;

/// Type alias for SQL Server client
pub type MssqlClient = Client<Compat<TcpStream>>;

/// Open a new SQL Server session.
///
/// The whole establishment (TCP connect, TLS and login) is bounded by
/// `settings.request_timeout`.
///
/// # Errors
/// Returns `ConnectorError::Connection` carrying the underlying cause.
pub async fn connect_client(settings: &ConnectionSettings) -> Result<MssqlClient, ConnectorError> {
    let address = settings.address();
    debug!(%address, database = %settings.database, "opening SQL Server session");

    match tokio::time::timeout(settings.request_timeout, establish(settings, &address)).await {
        Ok(result) => result,
        Err(elapsed) => Err(ConnectorError::connection(
            format!(
                "timed out after {}ms connecting to {address}",
                settings.request_timeout.as_millis()
            ),
            elapsed,
        )),
    }
}

async fn establish(
    settings: &ConnectionSettings,
    address: &str,
) -> Result<MssqlClient, ConnectorError> {
    let tcp = TcpStream::connect((settings.server.as_str(), settings.port))
        .await
        .map_err(|e| ConnectorError::connection(format!("TCP connection to {address} failed"), e))?;
    tcp.set_nodelay(true).map_err(|e| {
        ConnectorError::connection(format!("could not configure socket for {address}"), e)
    })?;

    Client::connect(settings.tiberius_config(), tcp.compat_write())
        .await
        .map_err(|e| ConnectorError::connection(format!("login to {address} failed"), e))
}
