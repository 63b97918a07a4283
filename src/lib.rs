//! SQL Server connector for workflow hosts.
//!
//! Query templates containing `{{ ... }}` expressions are resolved into SQL
//! with `@PARAM_<n>` placeholders plus an ordered parameter list, so user
//! input never lands in SQL text. Statements run on sessions supplied by an
//! injected [`ConnectionStrategy`](pool::ConnectionStrategy); results come
//! back with normalized column names.
//!
//! ```rust,no_run
//! use mssql_connector::prelude::*;
//! use serde_json::json;
//!
//! # async fn demo() -> Result<(), ConnectorError> {
//! let datasource = DatasourceConfig::from_json(json!({
//!     "endpoint": {"host": "localhost", "port": 1433},
//!     "authentication": {
//!         "username": "sa",
//!         "password": "secret",
//!         "custom": {"databaseName": {"value": "app"}}
//!     },
//!     "connection": {"useSsl": false}
//! }))?;
//! let connector = MssqlConnector::direct();
//! let mut context = RuntimeContext::new().with_variable("id", json!(5));
//! let action = QueryAction::prepared("SELECT * FROM users WHERE id = {{id}}");
//! let output = connector.execute(&datasource, &action, &mut context).await?;
//! # let _ = output;
//! # Ok(())
//! # }
//! ```

pub mod binding;
pub mod config;
pub mod connector;
pub mod error;
pub mod executor;
pub mod logging;
pub mod mssql;
pub mod pool;
pub mod prelude;
pub mod results;
pub mod schema;
pub mod template;
pub mod translation;
pub mod types;

pub use connector::{DataSourceService, MssqlConnector, QueryAction};
pub use error::{BindingError, ConnectorError, ErrorKind};
pub use types::RowValues;
