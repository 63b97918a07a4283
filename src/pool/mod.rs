//! Connection acquisition and release.
//!
//! How sessions are opened is an injected [`ConnectionStrategy`]; the
//! connector only relies on [`acquire`] and [`release`]. A session belongs to
//! the operation that acquired it and must be released on every exit path.

mod direct;
mod manager;
mod pooled;

use async_trait::async_trait;
use tracing::{debug, warn};

pub use direct::{DirectSession, DirectStrategy};
pub use manager::MssqlManager;
pub use pooled::{DEFAULT_POOL_SIZE, PooledSession, PooledStrategy};

use crate::config::{ConnectionSettings, DatasourceConfig};
use crate::error::ConnectorError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// An established session the executor can run statements on.
#[async_trait]
pub trait SqlSession: Send {
    /// Run `sql` as one batch with `params[i]` bound to `@PARAM_<i + 1>`.
    ///
    /// # Errors
    /// Returns `ConnectorError::Execution` with the driver message.
    async fn query(&mut self, sql: &str, params: &[RowValues])
    -> Result<ResultSet, ConnectorError>;

    /// Run literal SQL with no binding step.
    ///
    /// # Errors
    /// Returns `ConnectorError::Execution` with the driver message.
    async fn simple_query(&mut self, sql: &str) -> Result<ResultSet, ConnectorError>;

    /// Give the session back. Must not fail on an already broken session
    /// beyond reporting it.
    ///
    /// # Errors
    /// Returns the failure to close; callers log and discard it.
    async fn close(self) -> Result<(), ConnectorError>;
}

/// Pluggable way of turning validated settings into a session.
#[async_trait]
pub trait ConnectionStrategy: Send + Sync {
    type Session: SqlSession;

    /// # Errors
    /// Returns `ConnectorError::Connection` carrying the underlying cause.
    async fn connect(&self, settings: &ConnectionSettings)
    -> Result<Self::Session, ConnectorError>;
}

/// Validate `config` and open a session through `strategy`.
///
/// Configuration problems are reported before any network activity.
///
/// # Errors
/// Returns `ConnectorError::MissingConfig` / `InvalidConfig` for bad
/// configuration and `ConnectorError::Connection` when establishment fails.
pub async fn acquire<S>(strategy: &S, config: &DatasourceConfig) -> Result<S::Session, ConnectorError>
where
    S: ConnectionStrategy + ?Sized,
{
    let settings = config.validate()?;
    debug!(address = %settings.address(), database = %settings.database, "acquiring session");
    strategy.connect(&settings).await
}

/// Best-effort release: failures are logged and never surfaced, so they
/// cannot mask the outcome of the operation being cleaned up.
pub async fn release<C: SqlSession>(session: C) {
    match session.close().await {
        Ok(()) => debug!("session released"),
        Err(err) => warn!(error = %err, "failed to release SQL Server session"),
    }
}
