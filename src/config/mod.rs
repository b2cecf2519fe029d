//! Configuration module for redis-collections
//!
//! Connection settings for the TCP store client. Values come from defaults,
//! the builder, or a Redis-style configuration file.

mod parser;

pub use parser::{parse_config_file, parse_config_str, ConfigParseError};

use std::path::Path;
use std::time::Duration;

/// Connection configuration for [`TcpClient`](crate::client::TcpClient)
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Server host name or IP address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Database index selected after connecting
    pub db: usize,

    /// Password sent with AUTH (none = no authentication)
    pub password: Option<String>,

    /// ACL user name (Redis 6+), only used together with a password
    pub username: Option<String>,

    /// Name registered with CLIENT SETNAME
    pub client_name: Option<String>,

    /// Upper bound for establishing the TCP connection
    pub connect_timeout: Duration,

    /// Upper bound for a single command or transaction round trip
    pub command_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            host: "127.0.0.1".to_string(),
            port: 6379,
            db: 0,
            password: None,
            username: None,
            client_name: None,
            connect_timeout: Duration::from_secs(5),
            command_timeout: Duration::from_secs(5),
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(parse_config_file(path.as_ref())?)
    }

    /// The `host:port` address to connect to
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the database index
    pub fn db(mut self, db: usize) -> Self {
        self.config.db = db;
        self
    }

    /// Set the AUTH password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = Some(password.into());
        self
    }

    /// Set the ACL user name
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self
    }

    /// Set the client name
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.config.client_name = Some(name.into());
        self
    }

    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the per-command timeout
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.config.command_timeout = timeout;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Errors that can occur during configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file parse error
    #[error("Failed to parse config: {0}")]
    Parse(#[from] ConfigParseError),
}
