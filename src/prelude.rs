//! Convenient imports for common functionality.

pub use crate::binding::{
    BindingEvaluator, ContextEvaluator, EvaluatedBindings, PreparedStatementContext,
    RuntimeContext, render_interpolated, resolve_prepared,
};
pub use crate::config::{ConnectionSettings, DatasourceConfig};
pub use crate::connector::{DataSourceService, MssqlConnector, QueryAction};
pub use crate::error::{BindingError, ConnectorError, ErrorKind};
pub use crate::pool::{
    ConnectionStrategy, DirectStrategy, PooledStrategy, SqlSession, acquire, release,
};
pub use crate::results::{CustomDbRow, QueryOutput, Record, ResultSet};
pub use crate::schema::{Column, ConnectionStatus, DbSchema, SchemaMetadata, Table};
pub use crate::translation::translate_placeholders;
pub use crate::types::RowValues;
