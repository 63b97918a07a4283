//! The operations a host calls: resolve, execute, test, describe.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::binding::{
    BindingEvaluator, ContextEvaluator, RuntimeContext, render_interpolated, resolve_prepared,
};
use crate::config::DatasourceConfig;
use crate::error::ConnectorError;
use crate::executor;
use crate::pool::{self, ConnectionStrategy, DirectStrategy, PooledStrategy};
use crate::results::QueryOutput;
use crate::schema::{self, ConnectionStatus, SchemaMetadata};

/// A query action as configured by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryAction {
    /// Query template, possibly containing `{{ ... }}` expressions.
    #[serde(default)]
    pub body: String,
    /// Bind expressions as parameters instead of splicing them into the SQL.
    #[serde(default)]
    pub use_prepared_sql: bool,
}

impl QueryAction {
    #[must_use]
    pub fn prepared(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            use_prepared_sql: true,
        }
    }

    #[must_use]
    pub fn interpolated(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            use_prepared_sql: false,
        }
    }
}

/// Everything a host can ask of a datasource connector.
#[async_trait]
pub trait DataSourceService: Send + Sync {
    /// Turn the action's template into SQL, leaving bound values in the
    /// context's prepared-statement slot.
    ///
    /// # Errors
    /// Returns `ConnectorError::Binding` when an expression cannot be evaluated.
    fn resolve_template(
        &self,
        action: &QueryAction,
        context: &mut RuntimeContext,
    ) -> Result<String, ConnectorError>;

    /// Resolve and run the action, returning normalized records.
    ///
    /// # Errors
    /// Any `ConnectorError` kind.
    async fn execute(
        &self,
        datasource: &DatasourceConfig,
        action: &QueryAction,
        context: &mut RuntimeContext,
    ) -> Result<QueryOutput, ConnectorError>;

    /// # Errors
    /// Configuration, connectivity, or execution failures.
    async fn test_connection(
        &self,
        datasource: &DatasourceConfig,
    ) -> Result<ConnectionStatus, ConnectorError>;

    /// # Errors
    /// Configuration, connectivity, or execution failures.
    async fn describe_schema(
        &self,
        datasource: &DatasourceConfig,
    ) -> Result<SchemaMetadata, ConnectorError>;
}

/// SQL Server connector over an injected connection strategy and evaluator.
#[derive(Debug, Default)]
pub struct MssqlConnector<S, E = ContextEvaluator> {
    strategy: S,
    evaluator: E,
}

impl<S, E> MssqlConnector<S, E> {
    pub fn new(strategy: S, evaluator: E) -> Self {
        Self {
            strategy,
            evaluator,
        }
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }
}

impl MssqlConnector<DirectStrategy> {
    /// One fresh session per operation.
    #[must_use]
    pub fn direct() -> Self {
        Self::new(DirectStrategy, ContextEvaluator)
    }
}

impl MssqlConnector<PooledStrategy> {
    /// Sessions drawn from a per-datasource pool of at most `max_size`.
    #[must_use]
    pub fn pooled(max_size: usize) -> Self {
        Self::new(PooledStrategy::new(max_size), ContextEvaluator)
    }
}

#[async_trait]
impl<S, E> DataSourceService for MssqlConnector<S, E>
where
    S: ConnectionStrategy,
    E: BindingEvaluator,
{
    fn resolve_template(
        &self,
        action: &QueryAction,
        context: &mut RuntimeContext,
    ) -> Result<String, ConnectorError> {
        if action.use_prepared_sql {
            resolve_prepared(&action.body, context, &self.evaluator, false)
        } else {
            let sql = render_interpolated(&action.body, context, &self.evaluator, true)?;
            context.prepared_mut().reset();
            Ok(sql)
        }
    }

    async fn execute(
        &self,
        datasource: &DatasourceConfig,
        action: &QueryAction,
        context: &mut RuntimeContext,
    ) -> Result<QueryOutput, ConnectorError> {
        debug!(
            template = %action.body,
            prepared = action.use_prepared_sql,
            "resolving query action"
        );
        let sql = self.resolve_template(action, context)?;
        if sql.trim().is_empty() {
            debug!("blank statement, nothing to execute");
            return Ok(QueryOutput::empty());
        }

        let mut session = pool::acquire(&self.strategy, datasource).await?;
        let outcome = executor::run(&mut session, &sql, context.prepared().as_slice()).await;
        pool::release(session).await;

        outcome.map(|result_set| QueryOutput::from_result_set(&result_set))
    }

    async fn test_connection(
        &self,
        datasource: &DatasourceConfig,
    ) -> Result<ConnectionStatus, ConnectorError> {
        schema::test_connection(&self.strategy, datasource).await
    }

    async fn describe_schema(
        &self,
        datasource: &DatasourceConfig,
    ) -> Result<SchemaMetadata, ConnectorError> {
        schema::describe_schema(&self.strategy, datasource).await
    }
}
