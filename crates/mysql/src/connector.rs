//! MySQL connector implementation

use cistern_pool::{Connector, Error, Result, ServerConfig};
use mysql::{Conn, Opts, OptsBuilder};

/// Opens MySQL connections from a [`ServerConfig`].
///
/// The connection options are built once; every [`connect`] call opens a
/// fresh session from them. Sessions are closed by dropping the
/// connection, which sends the protocol-level quit for us.
///
/// [`connect`]: Connector::connect
pub struct MySqlConnector {
    opts: Opts,
    endpoint: String,
}

impl MySqlConnector {
    /// Build a connector for the given server address and credentials.
    #[must_use]
    pub fn new(server: &ServerConfig) -> Self {
        let database = if server.database.is_empty() {
            None
        } else {
            Some(server.database.clone())
        };
        let builder = OptsBuilder::new()
            .ip_or_hostname(Some(server.host.clone()))
            .tcp_port(server.port)
            .user(Some(server.username.clone()))
            .pass(Some(server.password.clone()))
            .db_name(database);
        Self {
            opts: Opts::from(builder),
            endpoint: format!("{}:{}", server.host, server.port),
        }
    }

    /// The connection options this connector opens sessions with.
    #[must_use]
    pub fn opts(&self) -> &Opts {
        &self.opts
    }
}

impl Connector for MySqlConnector {
    type Connection = Conn;

    fn connect(&self) -> Result<Conn> {
        tracing::debug!(endpoint = %self.endpoint, "opening mysql connection");
        Conn::new(self.opts.clone())
            .map_err(|e| Error::connect_with(format!("mysql connect to {} failed", self.endpoint), e))
    }
}

impl std::fmt::Debug for MySqlConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlConnector")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_server_config() {
        let server = ServerConfig {
            host: "db.internal".to_string(),
            port: 3307,
            username: "app".to_string(),
            password: "secret".to_string(),
            database: "orders".to_string(),
        };
        let connector = MySqlConnector::new(&server);
        assert_eq!(format!("{connector:?}"), "MySqlConnector { endpoint: \"db.internal:3307\" }");
    }

    #[test]
    fn empty_database_selects_none() {
        let server = ServerConfig {
            database: String::new(),
            ..ServerConfig::default()
        };
        let connector = MySqlConnector::new(&server);
        assert!(connector.opts().get_db_name().is_none());
    }
}
