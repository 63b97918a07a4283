mod common;

use common::{Call, ScriptedStrategy, datasource};
use mssql_connector::prelude::*;
use serde_json::json;

#[test]
fn prepared_action_binds_in_placeholder_order() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let strategy = ScriptedStrategy::returning(
            &["UserId", "DisplayName"],
            vec![vec![RowValues::Int(5), RowValues::Text("ann".into())]],
        );
        let connector = MssqlConnector::new(strategy.clone(), ContextEvaluator);
        let mut context = RuntimeContext::new()
            .with_variable("id", json!(5))
            .with_variable("name", json!("ann"));
        let action = QueryAction::prepared("SELECT * FROM t WHERE id = {{id}} AND name = {{name}}");

        let output = connector.execute(&datasource(), &action, &mut context).await?;

        assert_eq!(
            strategy.calls(),
            vec![Call::Query {
                sql: "SELECT * FROM t WHERE id = @PARAM_1 AND name = @PARAM_2".into(),
                params: vec![RowValues::Int(5), RowValues::Text("ann".into())],
            }]
        );
        assert_eq!(
            serde_json::to_value(&output)?,
            json!({"status": "ok", "data": [{"user_id": 5, "display_name": "ann"}]})
        );
        assert_eq!((strategy.connects(), strategy.closes()), (1, 1));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn blank_body_never_touches_a_connection() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let strategy = ScriptedStrategy::default();
        let connector = MssqlConnector::new(strategy.clone(), ContextEvaluator);

        for body in ["", "   ", "\n\t"] {
            let mut context = RuntimeContext::new();
            let output = connector
                .execute(&DatasourceConfig::default(), &QueryAction::prepared(body), &mut context)
                .await?;
            assert_eq!(output, QueryOutput::empty());
        }
        assert_eq!(strategy.connects(), 0);
        assert!(strategy.calls().is_empty());
        Ok::<(), ConnectorError>(())
    })?;
    Ok(())
}

#[test]
fn legacy_action_interpolates_and_binds_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let strategy = ScriptedStrategy::default();
        let connector = MssqlConnector::new(strategy.clone(), ContextEvaluator);
        let mut context = RuntimeContext::new().with_variable("name", json!("o'hara"));

        // Stale parameters from an earlier prepared run must not leak into this one.
        connector.resolve_template(&QueryAction::prepared("{{name}}"), &mut context)?;
        assert_eq!(context.prepared().len(), 1);

        let action = QueryAction::interpolated("DELETE FROM t WHERE name = '{{name}}'");
        let output = connector.execute(&datasource(), &action, &mut context).await?;

        assert!(output.data.is_empty());
        assert_eq!(
            strategy.calls(),
            vec![Call::Query {
                sql: "DELETE FROM t WHERE name = 'o''hara'".into(),
                params: vec![],
            }]
        );
        Ok::<(), ConnectorError>(())
    })?;
    Ok(())
}

#[test]
fn execution_failure_still_releases_the_session() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let strategy = ScriptedStrategy {
            fail_query: Some("Invalid object name 'nope'.".into()),
            fail_close: true,
            ..ScriptedStrategy::default()
        };
        let connector = MssqlConnector::new(strategy.clone(), ContextEvaluator);
        let mut context = RuntimeContext::new();

        let err = connector
            .execute(&datasource(), &QueryAction::prepared("select * from nope"), &mut context)
            .await
            .unwrap_err();

        // The close failure is swallowed; the query failure is what surfaces.
        assert_eq!(err.kind(), ErrorKind::Execution);
        assert_eq!(
            err.to_string(),
            "SQL Server: query failed: Invalid object name 'nope'."
        );
        assert_eq!((strategy.connects(), strategy.closes()), (1, 1));
        Ok::<(), ConnectorError>(())
    })?;
    Ok(())
}

#[test]
fn release_failure_does_not_mask_success() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let strategy = ScriptedStrategy {
            fail_close: true,
            ..ScriptedStrategy::returning(&["n"], vec![vec![RowValues::Int(1)]])
        };
        let connector = MssqlConnector::new(strategy.clone(), ContextEvaluator);
        let mut context = RuntimeContext::new();

        let output = connector
            .execute(&datasource(), &QueryAction::prepared("select 1 as n"), &mut context)
            .await?;
        assert_eq!(output.data.len(), 1);
        assert_eq!(strategy.closes(), 1);
        Ok::<(), ConnectorError>(())
    })?;
    Ok(())
}

#[test]
fn missing_configuration_fails_before_connecting() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let strategy = ScriptedStrategy::default();
        let connector = MssqlConnector::new(strategy.clone(), ContextEvaluator);
        let action = QueryAction::prepared("select 1");

        let mut no_endpoint = datasource();
        no_endpoint.endpoint = None;
        let mut no_auth = datasource();
        no_auth.authentication = None;
        let mut no_db = datasource();
        if let Some(auth) = no_db.authentication.as_mut() {
            auth.custom.database_name = None;
        }

        let mut fields = Vec::new();
        for config in [no_endpoint, no_auth, no_db] {
            let mut context = RuntimeContext::new();
            match connector.execute(&config, &action, &mut context).await {
                Err(ConnectorError::MissingConfig { field }) => fields.push(field),
                other => panic!("expected a configuration error, got {other:?}"),
            }
        }
        assert_eq!(fields, vec!["endpoint", "authentication", "databaseName"]);
        assert_eq!(strategy.connects(), 0);
        Ok::<(), ConnectorError>(())
    })?;
    Ok(())
}

#[test]
fn binding_failure_stops_before_connecting() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let strategy = ScriptedStrategy::default();
        let connector = MssqlConnector::new(strategy.clone(), ContextEvaluator);
        let mut context = RuntimeContext::new();

        let err = connector
            .execute(&datasource(), &QueryAction::prepared("select {{missing}}"), &mut context)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Binding);
        assert_eq!(strategy.connects(), 0);
        Ok::<(), ConnectorError>(())
    })?;
    Ok(())
}
