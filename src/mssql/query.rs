use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use futures_util::TryStreamExt;
use tiberius::numeric::Numeric;
use tiberius::{Query, QueryStream, Uuid};

use super::client::MssqlClient;
use crate::error::ConnectorError;
use crate::results::ResultSet;
use crate::translation::translate_placeholders;
use crate::types::{RowValues, TIMESTAMP_FORMAT};

/// Build a result set from a parameterized SQL Server statement.
///
/// `params[i]` is bound to `@PARAM_<i + 1>`.
///
/// # Errors
/// Returns `ConnectorError::Execution` with the driver message.
pub async fn build_result_set(
    client: &mut MssqlClient,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, ConnectorError> {
    let query_builder = bind_query_params(query, params);
    let stream = query_builder
        .query(client)
        .await
        .map_err(ConnectorError::execution)?;
    collect_stream(stream).await
}

/// Run literal SQL with no parameters as a simple batch.
///
/// # Errors
/// Returns `ConnectorError::Execution` with the driver message.
pub async fn run_simple_query(
    client: &mut MssqlClient,
    query: &str,
) -> Result<ResultSet, ConnectorError> {
    let stream = client
        .simple_query(query)
        .await
        .map_err(ConnectorError::execution)?;
    collect_stream(stream).await
}

async fn collect_stream(mut stream: QueryStream<'_>) -> Result<ResultSet, ConnectorError> {
    let column_names: Option<Vec<String>> = stream
        .columns()
        .await
        .map_err(ConnectorError::execution)?
        .map(|columns| columns.iter().map(|col| col.name().to_string()).collect());

    // Statements without a result set (DML, DDL) produce no rows.
    let Some(column_names) = column_names else {
        stream.into_results().await.map_err(ConnectorError::execution)?;
        return Ok(ResultSet::default());
    };
    let col_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(Arc::new(column_names));

    let mut rows_stream = stream.into_row_stream();
    while let Some(row) = rows_stream.try_next().await.map_err(ConnectorError::execution)? {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(extract_value(&row, i));
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

/// Extract a value from a row at a specific index.
///
/// Each supported Rust type is tried in turn; tiberius rejects mismatched
/// column types, so the first `Ok(Some(_))` is the column's native type.
/// NULL cells and unsupported types yield `RowValues::Null`.
fn extract_value(row: &tiberius::Row, idx: usize) -> RowValues {
    if let Ok(Some(val)) = row.try_get::<u8, _>(idx) {
        return RowValues::Int(i64::from(val));
    }
    if let Ok(Some(val)) = row.try_get::<i16, _>(idx) {
        return RowValues::Int(i64::from(val));
    }
    if let Ok(Some(val)) = row.try_get::<i32, _>(idx) {
        return RowValues::Int(i64::from(val));
    }
    if let Ok(Some(val)) = row.try_get::<i64, _>(idx) {
        return RowValues::Int(val);
    }
    if let Ok(Some(val)) = row.try_get::<f32, _>(idx) {
        return RowValues::Float(f64::from(val));
    }
    if let Ok(Some(val)) = row.try_get::<f64, _>(idx) {
        return RowValues::Float(val);
    }
    if let Ok(Some(val)) = row.try_get::<Numeric, _>(idx) {
        return RowValues::Float(f64::from(val));
    }
    if let Ok(Some(val)) = row.try_get::<bool, _>(idx) {
        return RowValues::Bool(val);
    }
    if let Ok(Some(val)) = row.try_get::<&str, _>(idx) {
        return RowValues::Text(val.to_string());
    }
    if let Ok(Some(val)) = row.try_get::<Uuid, _>(idx) {
        return RowValues::Text(val.to_string());
    }
    if let Ok(Some(val)) = row.try_get::<NaiveDateTime, _>(idx) {
        return RowValues::Timestamp(val);
    }
    if let Ok(Some(val)) = row.try_get::<DateTime<FixedOffset>, _>(idx) {
        return RowValues::Text(val.to_rfc3339());
    }
    if let Ok(Some(val)) = row.try_get::<NaiveDate, _>(idx) {
        return RowValues::Text(val.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(val)) = row.try_get::<NaiveTime, _>(idx) {
        return RowValues::Text(val.format("%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(val)) = row.try_get::<&[u8], _>(idx) {
        return RowValues::Blob(val.to_vec());
    }
    RowValues::Null
}

/// Bind parameters to the query in order, after rewriting `@PARAM_<n>`
/// markers to the driver's `@P<n>` names.
pub fn bind_query_params<'a>(query: &'a str, params: &[RowValues]) -> Query<'a> {
    let mut query_builder = Query::new(translate_placeholders(query));

    for param in params {
        match param {
            RowValues::Int(i) => query_builder.bind(*i),
            RowValues::Float(f) => query_builder.bind(*f),
            RowValues::Text(s) => query_builder.bind(s.clone()),
            RowValues::Bool(b) => query_builder.bind(*b),
            RowValues::Timestamp(dt) => {
                query_builder.bind(dt.format(TIMESTAMP_FORMAT).to_string());
            }
            RowValues::Null => query_builder.bind(Option::<String>::None),
            RowValues::JSON(jsval) => query_builder.bind(jsval.to_string()),
            RowValues::Blob(bytes) => query_builder.bind(bytes.clone()),
        }
    }

    query_builder
}
