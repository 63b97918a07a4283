//! Datasource configuration as the host supplies it, and the validated
//! settings a connection is opened with.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tiberius::{AuthMethod, Config as TiberiusConfig, EncryptionLevel};

use crate::error::ConnectorError;

pub const DEFAULT_PORT: u16 = 1433;
/// Milliseconds allowed for establishing a connection when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Datasource options in the host's JSON shape.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasourceConfig {
    pub endpoint: Option<Endpoint>,
    pub authentication: Option<Authentication>,
    #[serde(default)]
    pub connection: ConnectionOptions,
    pub request_timeout: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Endpoint {
    #[serde(default)]
    pub host: String,
    pub port: Option<Port>,
}

/// Hosts send the port either as a number or as text.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Port {
    Number(u16),
    Text(String),
}

#[derive(Clone, Default, Deserialize, Serialize)]
pub struct Authentication {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub custom: CustomAuthentication,
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authentication")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("custom", &self.custom)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAuthentication {
    pub database_name: Option<FieldValue>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FieldValue {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionOptions {
    #[serde(default)]
    pub use_ssl: bool,
}

impl DatasourceConfig {
    /// Parse the host's datasource JSON.
    ///
    /// # Errors
    /// Returns `ConnectorError::InvalidConfig` if the JSON does not match the expected shape.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ConnectorError> {
        serde_json::from_value(value).map_err(|e| ConnectorError::InvalidConfig(e.to_string()))
    }

    /// Check required fields and produce connection settings.
    ///
    /// Fields are checked in order (endpoint, authentication, database name) and
    /// the first missing one is reported.
    ///
    /// # Errors
    /// Returns `ConnectorError::MissingConfig` naming the missing field, or
    /// `ConnectorError::InvalidConfig` for an unparsable port.
    pub fn validate(&self) -> Result<ConnectionSettings, ConnectorError> {
        let endpoint = self
            .endpoint
            .as_ref()
            .filter(|e| !e.host.trim().is_empty())
            .ok_or(ConnectorError::MissingConfig { field: "endpoint" })?;
        let auth = self
            .authentication
            .as_ref()
            .ok_or(ConnectorError::MissingConfig {
                field: "authentication",
            })?;
        let database = auth
            .custom
            .database_name
            .as_ref()
            .map(|d| d.value.trim())
            .filter(|d| !d.is_empty())
            .ok_or(ConnectorError::MissingConfig {
                field: "databaseName",
            })?;

        let port = match &endpoint.port {
            None => DEFAULT_PORT,
            Some(Port::Number(p)) => *p,
            Some(Port::Text(s)) if s.trim().is_empty() => DEFAULT_PORT,
            Some(Port::Text(s)) => s.trim().parse::<u16>().map_err(|e| {
                ConnectorError::InvalidConfig(format!("port `{s}` is not a valid number: {e}"))
            })?,
        };

        Ok(ConnectionSettings::builder(
            endpoint.host.trim().to_string(),
            database.to_string(),
            auth.username.clone(),
            auth.password.clone(),
        )
        .port(port)
        .encrypt(self.connection.use_ssl)
        .request_timeout(Duration::from_millis(
            self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
        ))
        .finish())
    }
}

/// Everything needed to open a SQL Server session.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ConnectionSettings {
    pub server: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub(crate) password: String,
    pub encrypt: bool,
    /// Upper bound on connection establishment.
    pub request_timeout: Duration,
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("encrypt", &self.encrypt)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ConnectionSettings {
    #[must_use]
    pub fn builder(
        server: String,
        database: String,
        user: String,
        password: String,
    ) -> ConnectionSettingsBuilder {
        ConnectionSettingsBuilder::new(server, database, user, password)
    }

    /// Identity of the datasource for pool reuse. Two settings with the same
    /// key may share pooled sessions.
    #[must_use]
    pub fn pool_key(&self) -> String {
        format!(
            "{}:{}/{}?user={}&encrypt={}",
            self.server, self.port, self.database, self.user, self.encrypt
        )
    }

    /// `host:port` used for the TCP connect and error messages.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.server, self.port)
    }

    /// Driver configuration: SQL login, server certificate always trusted,
    /// encryption following the datasource's SSL flag.
    #[must_use]
    pub fn tiberius_config(&self) -> TiberiusConfig {
        let mut config = TiberiusConfig::new();
        config.host(&self.server);
        config.port(self.port);
        config.database(&self.database);
        config.authentication(AuthMethod::sql_server(&self.user, &self.password));
        config.trust_cert();
        config.encryption(if self.encrypt {
            EncryptionLevel::Required
        } else {
            EncryptionLevel::Off
        });
        config
    }
}

/// Fluent builder for [`ConnectionSettings`].
#[derive(Debug, Clone)]
pub struct ConnectionSettingsBuilder {
    settings: ConnectionSettings,
}

impl ConnectionSettingsBuilder {
    #[must_use]
    pub fn new(server: String, database: String, user: String, password: String) -> Self {
        Self {
            settings: ConnectionSettings {
                server,
                port: DEFAULT_PORT,
                database,
                user,
                password,
                encrypt: false,
                request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            },
        }
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.settings.port = port;
        self
    }

    #[must_use]
    pub fn encrypt(mut self, encrypt: bool) -> Self {
        self.settings.encrypt = encrypt;
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.settings.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn finish(self) -> ConnectionSettings {
        self.settings
    }
}
