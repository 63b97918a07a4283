//! Schema discovery and the connectivity probe.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::DatasourceConfig;
use crate::error::ConnectorError;
use crate::executor;
use crate::pool::{self, ConnectionStrategy};
use crate::results::ResultSet;

/// Lists every user table column, in ordinal order within each table.
/// Schema comes first in the ordering so one table's columns stay contiguous.
pub const CATALOG_QUERY: &str = "SELECT TABLE_NAME, COLUMN_NAME, DATA_TYPE \
     FROM INFORMATION_SCHEMA.COLUMNS \
     WHERE TABLE_SCHEMA NOT IN ('sys', 'INFORMATION_SCHEMA') \
     ORDER BY TABLE_SCHEMA, TABLE_NAME, ORDINAL_POSITION";

/// Lightweight reachability check used by the test operation.
pub const PROBE_QUERY: &str = "select name from sys.databases";

const TABLE_TYPE: &str = "table";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "dataType")]
    pub data_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DbSchema {
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaMetadata {
    #[serde(rename = "dbSchema")]
    pub db_schema: DbSchema,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub status: &'static str,
}

/// Fold `(table, column, data type)` rows into tables.
///
/// Tables appear in first-seen order; each row appends one column to its
/// table, so column order follows the row order.
pub fn fold_catalog_rows<I, S>(rows: I) -> DbSchema
where
    I: IntoIterator<Item = (S, S, S)>,
    S: Into<String>,
{
    let mut tables: Vec<Table> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (table, column, data_type) in rows {
        let table = table.into();
        let slot = match index.get(&table) {
            Some(&slot) => slot,
            None => {
                index.insert(table.clone(), tables.len());
                tables.push(Table {
                    name: table,
                    kind: TABLE_TYPE.to_string(),
                    columns: Vec::new(),
                });
                tables.len() - 1
            }
        };
        tables[slot].columns.push(Column {
            name: column.into(),
            data_type: data_type.into(),
        });
    }

    DbSchema { tables }
}

fn catalog_rows(result_set: &ResultSet) -> Result<Vec<(String, String, String)>, ConnectorError> {
    let text = |row: &crate::results::CustomDbRow, name: &str| {
        row.get(name)
            .and_then(|v| v.as_text())
            .map(str::to_string)
            .ok_or_else(|| {
                ConnectorError::Execution(format!("catalog row is missing text column `{name}`"))
            })
    };
    result_set
        .results
        .iter()
        .map(|row| {
            Ok((
                text(row, "table_name")?,
                text(row, "column_name")?,
                text(row, "data_type")?,
            ))
        })
        .collect()
}

/// Read the catalog and build the table/column model.
///
/// The session is released whether or not the query succeeds.
///
/// # Errors
/// Configuration, connectivity, or execution failures.
pub async fn describe_schema<S>(
    strategy: &S,
    config: &DatasourceConfig,
) -> Result<SchemaMetadata, ConnectorError>
where
    S: ConnectionStrategy + ?Sized,
{
    let mut session = pool::acquire(strategy, config).await?;
    let outcome = executor::run_literal(&mut session, CATALOG_QUERY).await;
    pool::release(session).await;

    let rows = catalog_rows(&outcome?)?;
    Ok(SchemaMetadata {
        db_schema: fold_catalog_rows(rows),
    })
}

/// Check that the datasource is reachable and the credentials work.
///
/// # Errors
/// Configuration, connectivity, or execution failures.
pub async fn test_connection<S>(
    strategy: &S,
    config: &DatasourceConfig,
) -> Result<ConnectionStatus, ConnectorError>
where
    S: ConnectionStrategy + ?Sized,
{
    let mut session = pool::acquire(strategy, config).await?;
    let outcome = executor::run_literal(&mut session, PROBE_QUERY).await;
    pool::release(session).await;

    outcome.map(|_| ConnectionStatus { status: "ok" })
}
