mod args;

use clap::Parser;
use mssql_connector::binding::RuntimeContext;
use mssql_connector::config::DatasourceConfig;
use mssql_connector::connector::{DataSourceService, QueryAction};
use mssql_connector::pool::DirectStrategy;
use mssql_connector::{ConnectorError, MssqlConnector, logging};
use serde::Serialize;

use crate::args::{Args, Command};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid JSON in {what}: {source}")]
    Json {
        what: &'static str,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Connector(#[from] ConnectorError),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init(args.log_level.into());

    match run(args).await {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

async fn run(args: Args) -> Result<String, CliError> {
    let raw = std::fs::read_to_string(&args.datasource).map_err(|source| CliError::Read {
        path: args.datasource.display().to_string(),
        source,
    })?;
    let value = serde_json::from_str(&raw).map_err(|source| CliError::Json {
        what: "datasource file",
        source,
    })?;
    let datasource = DatasourceConfig::from_json(value)?;

    if args.pooled {
        dispatch(&MssqlConnector::pooled(1), &datasource, args.command).await
    } else {
        let connector: MssqlConnector<DirectStrategy> = MssqlConnector::direct();
        dispatch(&connector, &datasource, args.command).await
    }
}

async fn dispatch<S>(
    connector: &S,
    datasource: &DatasourceConfig,
    command: Command,
) -> Result<String, CliError>
where
    S: DataSourceService,
{
    match command {
        Command::Test => render(&connector.test_connection(datasource).await?),
        Command::Metadata => render(&connector.describe_schema(datasource).await?),
        Command::Query {
            body,
            context,
            prepared,
        } => {
            let context = serde_json::from_str(&context).map_err(|source| CliError::Json {
                what: "--context",
                source,
            })?;
            let mut context = RuntimeContext::from_json(context);
            let action = QueryAction {
                body,
                use_prepared_sql: prepared,
            };
            render(&connector.execute(datasource, &action, &mut context).await?)
        }
    }
}

fn render<T: Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|source| CliError::Json {
        what: "output",
        source,
    })
}

