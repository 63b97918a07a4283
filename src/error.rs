use thiserror::Error;

/// Name the connector reports itself under in every surfaced error.
pub const DISPLAY_NAME: &str = "SQL Server";

/// Boxed driver or pool error kept as the cause of a connectivity failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An embedded expression could not be evaluated against the runtime context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not resolve `{expression}`: {reason}")]
pub struct BindingError {
    /// The expression text as it appeared between the delimiters.
    pub expression: String,
    pub reason: String,
}

impl BindingError {
    pub fn new(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            reason: reason.into(),
        }
    }
}

/// Integration failure surfaced to the host.
///
/// Every variant renders with the connector's display name as a prefix so the
/// host can show it as-is. Nothing here is retried by the connector.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("{name}: missing required datasource field `{field}`", name = DISPLAY_NAME)]
    MissingConfig { field: &'static str },

    #[error("{name}: invalid datasource configuration: {0}", name = DISPLAY_NAME)]
    InvalidConfig(String),

    #[error("{name}: connection failed: {message}: {source}", name = DISPLAY_NAME)]
    Connection {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("{name}: query failed: {0}", name = DISPLAY_NAME)]
    Execution(String),

    #[error(transparent)]
    Binding(#[from] BindingError),
}

/// Coarse classification of a [`ConnectorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Connectivity,
    Execution,
    Binding,
}

impl ConnectorError {
    /// Wrap an establishment failure, keeping the driver error as the source.
    pub fn connection<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        ConnectorError::Connection {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Wrap a driver failure that happened while running a statement.
    pub fn execution(err: impl std::fmt::Display) -> Self {
        ConnectorError::Execution(err.to_string())
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConnectorError::MissingConfig { .. } | ConnectorError::InvalidConfig(_) => {
                ErrorKind::Configuration
            }
            ConnectorError::Connection { .. } => ErrorKind::Connectivity,
            ConnectorError::Execution(_) => ErrorKind::Execution,
            ConnectorError::Binding(_) => ErrorKind::Binding,
        }
    }
}
