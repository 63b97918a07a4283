use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Run parameterized queries against SQL Server")]
pub(crate) struct Args {
    /// Datasource JSON file (endpoint, authentication, connection).
    #[arg(long)]
    pub(crate) datasource: PathBuf,
    #[arg(long, value_enum, default_value = "warn")]
    pub(crate) log_level: LogLevel,
    /// Draw sessions from a pool instead of opening one per command.
    #[arg(long)]
    pub(crate) pooled: bool,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Check that the server is reachable with the given credentials.
    Test,
    /// Print tables and columns.
    Metadata,
    /// Run a query template.
    Query {
        #[arg(long)]
        body: String,
        /// JSON object the template's `{{ ... }}` expressions are evaluated against.
        #[arg(long, default_value = "{}")]
        context: String,
        /// Bind expressions as parameters instead of splicing escaped literals.
        #[arg(long)]
        prepared: bool,
    },
}
