//! Runs against a real server when `MSSQL_TEST_DATASOURCE` names a datasource
//! JSON file; otherwise every test returns early.

use mssql_connector::prelude::*;
use serde_json::json;

fn live_datasource() -> Result<Option<DatasourceConfig>, Box<dyn std::error::Error>> {
    let Ok(path) = std::env::var("MSSQL_TEST_DATASOURCE") else {
        return Ok(None);
    };
    let raw = std::fs::read_to_string(path)?;
    Ok(Some(DatasourceConfig::from_json(serde_json::from_str(&raw)?)?))
}

#[test]
fn live_round_trip_with_bound_parameters() -> Result<(), Box<dyn std::error::Error>> {
    let Some(datasource) = live_datasource()? else {
        return Ok(());
    };
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        for connector in [
            Box::new(MssqlConnector::direct()) as Box<dyn DataSourceService>,
            Box::new(MssqlConnector::pooled(2)),
        ] {
            connector.test_connection(&datasource).await?;

            let mut context = RuntimeContext::new()
                .with_variable("id", json!(5))
                .with_variable("name", json!("o'hara; DROP TABLE x"));
            let action = QueryAction::prepared(
                "SELECT {{id}} AS RowId, {{name}} AS DisplayName, '{{name}}' AS literal_text",
            );
            let output = connector.execute(&datasource, &action, &mut context).await?;
            assert_eq!(
                output.data,
                vec![json!({
                    "row_id": 5,
                    "display_name": "o'hara; DROP TABLE x",
                    "literal_text": "@PARAM_3"
                })
                .as_object()
                .cloned()
                .unwrap_or_default()]
            );

            connector.describe_schema(&datasource).await?;
        }
        Ok::<(), ConnectorError>(())
    })?;
    Ok(())
}
