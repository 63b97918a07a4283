use std::fmt;

use deadpool::managed::{Manager, Metrics, RecycleError, RecycleResult};

use crate::config::ConnectionSettings;
use crate::error::ConnectorError;
use crate::mssql::{MssqlClient, connect_client};

/// deadpool manager creating tiberius clients for one datasource.
#[derive(Clone)]
pub struct MssqlManager {
    settings: ConnectionSettings,
}

impl fmt::Debug for MssqlManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MssqlManager")
            .field("server", &self.settings.server)
            .field("port", &self.settings.port)
            .field("database", &self.settings.database)
            .finish()
    }
}

impl MssqlManager {
    #[must_use]
    pub fn new(settings: ConnectionSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }
}

impl Manager for MssqlManager {
    type Type = MssqlClient;
    type Error = ConnectorError;

    async fn create(&self) -> Result<MssqlClient, ConnectorError> {
        connect_client(&self.settings).await
    }

    async fn recycle(
        &self,
        client: &mut MssqlClient,
        _metrics: &Metrics,
    ) -> RecycleResult<ConnectorError> {
        // Check if connection is still usable by running a simple query
        let stream = client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| RecycleError::Backend(ConnectorError::execution(e)))?;
        stream
            .into_results()
            .await
            .map_err(|e| RecycleError::Backend(ConnectorError::execution(e)))?;
        Ok(())
    }
}
