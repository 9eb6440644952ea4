use serde::{Deserialize, Serialize};
use tiberius::{AuthMethod, Client, Config as TiberiusConfig};
use tokio::net::TcpStream;
use tokio_util::compat::Compat;

/// Type alias for a SQL Server client over a tokio TCP stream.
pub type MssqlClient = Client<Compat<TcpStream>>;

/// Connection settings for SQL Server.
///
/// Derives serde so deployments can keep these in a config file:
/// ```rust
/// use tsql_template::prelude::*;
///
/// let config: MssqlConfig = serde_json::from_str(
///     r#"{"server":"localhost","database":"master","user":"sa","password":"pw"}"#,
/// ).unwrap();
/// assert_eq!(config.port, None);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MssqlConfig {
    pub server: String,
    pub database: String,
    pub user: String,
    pub password: String,
    /// Defaults to 1433 when unset.
    #[serde(default)]
    pub port: Option<u16>,
    /// Named instance, if any.
    #[serde(default)]
    pub instance_name: Option<String>,
}

impl MssqlConfig {
    #[must_use]
    pub fn new(
        server: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            database: database.into(),
            user: user.into(),
            password: password.into(),
            port: None,
            instance_name: None,
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn with_instance_name(mut self, instance_name: impl Into<String>) -> Self {
        self.instance_name = Some(instance_name.into());
        self
    }

    #[must_use]
    pub(crate) fn resolved_port(&self) -> u16 {
        self.port.unwrap_or(1433)
    }

    pub(crate) fn to_tiberius(&self) -> TiberiusConfig {
        let mut config = TiberiusConfig::new();
        config.host(&self.server);
        config.database(&self.database);
        config.port(self.resolved_port());
        config.authentication(AuthMethod::sql_server(&self.user, &self.password));
        if let Some(instance) = &self.instance_name {
            config.instance_name(instance);
        }
        config.trust_cert();
        config
    }
}
