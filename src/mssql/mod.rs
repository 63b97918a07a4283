// MSSQL module - tiberius-facing pieces of the connector
//
// - client: TCP + TDS session establishment bounded by the request timeout
// - query: parameter binding, statement execution and row extraction

pub mod client;
pub mod query;

pub use client::{MssqlClient, connect_client};
pub use query::{bind_query_params, build_result_set, run_simple_query};
