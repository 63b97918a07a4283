use std::collections::HashMap;

use async_trait::async_trait;
use deadpool::managed::{Object, Pool, PoolError};
use tokio::sync::Mutex;
use tracing::debug;

use super::manager::MssqlManager;
use super::{ConnectionStrategy, SqlSession};
use crate::config::ConnectionSettings;
use crate::error::ConnectorError;
use crate::mssql::{build_result_set, run_simple_query};
use crate::results::ResultSet;
use crate::types::RowValues;

pub const DEFAULT_POOL_SIZE: usize = 20;

/// Reuses one deadpool pool per datasource; release hands the session back.
///
/// Pools are keyed by the complete settings, so a rotated password or a new
/// timeout gets its own pool. Pools are never closed while the strategy is
/// alive; a pool nobody holds anymore drops its idle sessions.
pub struct PooledStrategy {
    max_size: usize,
    pools: Mutex<HashMap<ConnectionSettings, Pool<MssqlManager>>>,
}

impl std::fmt::Debug for PooledStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledStrategy")
            .field("max_size", &self.max_size)
            .finish_non_exhaustive()
    }
}

impl Default for PooledStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

impl PooledStrategy {
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size: max_size.max(1),
            pools: Mutex::new(HashMap::new()),
        }
    }

    async fn pool_for(
        &self,
        settings: &ConnectionSettings,
    ) -> Result<Pool<MssqlManager>, ConnectorError> {
        let mut pools = self.pools.lock().await;
        if let Some(pool) = pools.get(settings) {
            return Ok(pool.clone());
        }

        let key = settings.pool_key();
        debug!(%key, max_size = self.max_size, "building SQL Server pool");
        let pool = Pool::builder(MssqlManager::new(settings.clone()))
            .max_size(self.max_size)
            .build()
            .map_err(|e| {
                ConnectorError::connection(format!("could not build pool for {key}"), e)
            })?;
        pools.insert(settings.clone(), pool.clone());
        Ok(pool)
    }
}

/// A session checked out of a pool.
pub struct PooledSession {
    conn: Object<MssqlManager>,
}

impl std::fmt::Debug for PooledSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledSession")
            .field("conn", &"<MssqlClient>")
            .finish()
    }
}

#[async_trait]
impl ConnectionStrategy for PooledStrategy {
    type Session = PooledSession;

    async fn connect(&self, settings: &ConnectionSettings) -> Result<PooledSession, ConnectorError> {
        let pool = self.pool_for(settings).await?;
        let address = settings.address();
        let conn = match tokio::time::timeout(settings.request_timeout, pool.get()).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(PoolError::Backend(e))) => return Err(e),
            Ok(Err(e)) => {
                return Err(ConnectorError::connection(
                    format!("could not check out a session for {address}"),
                    e,
                ));
            }
            Err(elapsed) => {
                return Err(ConnectorError::connection(
                    format!(
                        "timed out after {}ms waiting for a session to {address}",
                        settings.request_timeout.as_millis()
                    ),
                    elapsed,
                ));
            }
        };
        Ok(PooledSession { conn })
    }
}

#[async_trait]
impl SqlSession for PooledSession {
    async fn query(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, ConnectorError> {
        build_result_set(&mut self.conn, sql, params).await
    }

    async fn simple_query(&mut self, sql: &str) -> Result<ResultSet, ConnectorError> {
        run_simple_query(&mut self.conn, sql).await
    }

    async fn close(self) -> Result<(), ConnectorError> {
        // Dropping the object returns it to the pool; recycle() vets it on next checkout.
        drop(self.conn);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings() -> ConnectionSettings {
        ConnectionSettings::builder("db.test".into(), "app".into(), "sa".into(), "secret".into())
            .finish()
    }

    #[test]
    fn equal_settings_share_one_pool() -> Result<(), Box<dyn std::error::Error>> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(async move {
            let strategy = PooledStrategy::new(4);
            let first = strategy.pool_for(&settings()).await?;
            let second = strategy.pool_for(&settings()).await?;
            assert!(std::ptr::eq(first.manager(), second.manager()));
            assert_eq!(first.status().max_size, 4);
            assert_eq!(strategy.pools.lock().await.len(), 1);
            Ok::<(), ConnectorError>(())
        })?;
        Ok(())
    }

    #[test]
    fn changed_settings_get_their_own_pool() -> Result<(), Box<dyn std::error::Error>> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(async move {
            let strategy = PooledStrategy::default();
            let original = strategy.pool_for(&settings()).await?;

            let rotated = ConnectionSettings::builder(
                "db.test".into(),
                "app".into(),
                "sa".into(),
                "rotated".into(),
            )
            .finish();
            let slower = ConnectionSettings::builder(
                "db.test".into(),
                "app".into(),
                "sa".into(),
                "secret".into(),
            )
            .request_timeout(Duration::from_millis(90_000))
            .finish();

            let by_password = strategy.pool_for(&rotated).await?;
            let by_timeout = strategy.pool_for(&slower).await?;
            assert!(!std::ptr::eq(original.manager(), by_password.manager()));
            assert!(!std::ptr::eq(original.manager(), by_timeout.manager()));
            assert_eq!(by_password.manager().settings(), &rotated);
            assert_eq!(original.status().max_size, DEFAULT_POOL_SIZE);

            // A caller still holding the first pool keeps a usable pool.
            assert!(!original.is_closed());
            let again = strategy.pool_for(&settings()).await?;
            assert!(std::ptr::eq(original.manager(), again.manager()));
            assert_eq!(strategy.pools.lock().await.len(), 3);
            Ok::<(), ConnectorError>(())
        })?;
        Ok(())
    }
}
