#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mssql_connector::prelude::*;
use serde_json::json;

/// What a scripted session was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Query { sql: String, params: Vec<RowValues> },
    Simple { sql: String },
}

#[derive(Debug, Default)]
pub struct Journal {
    pub connects: usize,
    pub closes: usize,
    pub calls: Vec<Call>,
}

/// In-memory strategy whose sessions return a canned result.
#[derive(Clone, Default)]
pub struct ScriptedStrategy {
    pub journal: Arc<Mutex<Journal>>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<RowValues>>,
    pub fail_connect: bool,
    pub fail_query: Option<String>,
    pub fail_close: bool,
}

impl ScriptedStrategy {
    pub fn returning(columns: &[&str], rows: Vec<Vec<RowValues>>) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
            ..Self::default()
        }
    }

    pub fn connects(&self) -> usize {
        self.journal.lock().unwrap().connects
    }

    pub fn closes(&self) -> usize {
        self.journal.lock().unwrap().closes
    }

    pub fn calls(&self) -> Vec<Call> {
        self.journal.lock().unwrap().calls.clone()
    }
}

pub struct ScriptedSession {
    script: ScriptedStrategy,
}

impl ScriptedSession {
    fn answer(&self) -> Result<ResultSet, ConnectorError> {
        if let Some(message) = &self.script.fail_query {
            return Err(ConnectorError::Execution(message.clone()));
        }
        let mut rs = ResultSet::with_capacity(self.script.rows.len());
        if !self.script.columns.is_empty() {
            rs.set_column_names(Arc::new(self.script.columns.clone()));
        }
        for row in &self.script.rows {
            rs.add_row_values(row.clone());
        }
        Ok(rs)
    }
}

#[async_trait]
impl ConnectionStrategy for ScriptedStrategy {
    type Session = ScriptedSession;

    async fn connect(&self, settings: &ConnectionSettings) -> Result<ScriptedSession, ConnectorError> {
        if self.fail_connect {
            return Err(ConnectorError::connection(
                format!("TCP connection to {} failed", settings.address()),
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            ));
        }
        self.journal.lock().unwrap().connects += 1;
        Ok(ScriptedSession {
            script: self.clone(),
        })
    }
}

#[async_trait]
impl SqlSession for ScriptedSession {
    async fn query(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, ConnectorError> {
        self.script.journal.lock().unwrap().calls.push(Call::Query {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        self.answer()
    }

    async fn simple_query(&mut self, sql: &str) -> Result<ResultSet, ConnectorError> {
        self.script.journal.lock().unwrap().calls.push(Call::Simple {
            sql: sql.to_string(),
        });
        self.answer()
    }

    async fn close(self) -> Result<(), ConnectorError> {
        self.script.journal.lock().unwrap().closes += 1;
        if self.script.fail_close {
            return Err(ConnectorError::Execution("socket already closed".into()));
        }
        Ok(())
    }
}

pub fn datasource() -> DatasourceConfig {
    DatasourceConfig::from_json(json!({
        "endpoint": {"host": "db.test", "port": 1433},
        "authentication": {
            "username": "sa",
            "password": "secret",
            "custom": {"databaseName": {"value": "app"}}
        },
        "connection": {"useSsl": false}
    }))
    .unwrap()
}
