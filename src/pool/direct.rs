use async_trait::async_trait;

use super::{ConnectionStrategy, SqlSession};
use crate::config::ConnectionSettings;
use crate::error::ConnectorError;
use crate::mssql::{MssqlClient, build_result_set, connect_client, run_simple_query};
use crate::results::ResultSet;
use crate::types::RowValues;

/// Opens a dedicated session per acquire and closes it on release.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectStrategy;

/// A session owning its own tiberius client.
pub struct DirectSession {
    client: MssqlClient,
}

impl std::fmt::Debug for DirectSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectSession")
            .field("client", &"<MssqlClient>")
            .finish()
    }
}

#[async_trait]
impl ConnectionStrategy for DirectStrategy {
    type Session = DirectSession;

    async fn connect(&self, settings: &ConnectionSettings) -> Result<DirectSession, ConnectorError> {
        let client = connect_client(settings).await?;
        Ok(DirectSession { client })
    }
}

#[async_trait]
impl SqlSession for DirectSession {
    async fn query(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, ConnectorError> {
        build_result_set(&mut self.client, sql, params).await
    }

    async fn simple_query(&mut self, sql: &str) -> Result<ResultSet, ConnectorError> {
        run_simple_query(&mut self.client, sql).await
    }

    async fn close(self) -> Result<(), ConnectorError> {
        self.client.close().await.map_err(ConnectorError::execution)
    }
}
