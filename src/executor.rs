//! Statement execution on an acquired session.

use tracing::debug;

use crate::error::ConnectorError;
use crate::pool::SqlSession;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Run a parameterized statement and normalize its column names.
///
/// `params[i]` binds to slot `PARAM_<i + 1>`. Blank SQL returns an empty
/// result without touching the session. The statement text is not logged:
/// on the interpolated path it carries the context values.
///
/// # Errors
/// Returns `ConnectorError::Execution` with the driver message; nothing is retried.
pub async fn run<C>(
    session: &mut C,
    sql: &str,
    params: &[RowValues],
) -> Result<ResultSet, ConnectorError>
where
    C: SqlSession + ?Sized,
{
    if sql.trim().is_empty() {
        return Ok(ResultSet::default());
    }
    debug!(
        statement_len = sql.len(),
        params = params.len(),
        "executing statement"
    );
    let result_set = session.query(sql, params).await?;
    Ok(result_set.normalize_columns())
}

/// Run literal SQL (catalog queries, probes) with no binding step.
///
/// # Errors
/// Returns `ConnectorError::Execution` with the driver message.
pub async fn run_literal<C>(session: &mut C, sql: &str) -> Result<ResultSet, ConnectorError>
where
    C: SqlSession + ?Sized,
{
    if sql.trim().is_empty() {
        return Ok(ResultSet::default());
    }
    debug!(sql, "executing literal statement");
    let result_set = session.simple_query(sql).await?;
    Ok(result_set.normalize_columns())
}
