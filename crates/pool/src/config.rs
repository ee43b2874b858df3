//! Pool and server configuration types, plus the `key=value` file loader.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Address and credentials of the backing database server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server hostname or IP address
    pub host: String,
    /// Server TCP port
    pub port: u16,
    /// Login user name
    pub username: String,
    /// Login password
    pub password: String,
    /// Database to select after connecting (empty selects none)
    pub database: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3306,
            username: "root".to_string(),
            password: String::new(),
            database: String::new(),
        }
    }
}

/// Sizing and timing configuration for the pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Connections created at startup; also the floor the reaper never
    /// shrinks below
    pub init_size: usize,
    /// Ceiling for the total number of live connections (idle + borrowed)
    pub max_size: usize,
    /// Idle duration after which a connection becomes eligible for reaping
    pub max_idle: Duration,
    /// How long `acquire` waits for a connection before failing
    pub acquire_timeout: Duration,
    /// How often the reaper scans the idle queue; defaults to `max_idle`
    pub reap_interval: Option<Duration>,
    /// Pause between producer reconnect attempts after a failed connect
    pub retry_delay: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            init_size: 1,
            max_size: 10,
            max_idle: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(30),
            reap_interval: None,
            retry_delay: Duration::from_millis(500),
        }
    }
}

impl PoolConfig {
    /// Validate the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(Error::configuration("max_size must be greater than 0"));
        }
        if self.init_size > self.max_size {
            return Err(Error::configuration(format!(
                "init_size ({}) must not exceed max_size ({})",
                self.init_size, self.max_size
            )));
        }
        if self.acquire_timeout.is_zero() {
            return Err(Error::configuration(
                "acquire_timeout must be greater than zero",
            ));
        }
        Ok(())
    }

    /// The effective reaper scan interval (`reap_interval`, or `max_idle`
    /// when not set).
    #[must_use]
    pub fn effective_reap_interval(&self) -> Duration {
        self.reap_interval.unwrap_or(self.max_idle)
    }
}

/// Full pool settings: where to connect plus how to size the pool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Backing server address and credentials
    pub server: ServerConfig,
    /// Pool sizing and timing
    pub pool: PoolConfig,
}

impl Settings {
    /// Load settings from a line-oriented `key=value` file.
    ///
    /// Recognized keys: `ip`, `port`, `username`, `password`, `dbname`,
    /// `initsize`, `maxSize`, `maxIdleTime` (seconds), `connectionTimeout`
    /// (milliseconds). Lines without `=` are treated as comments.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with(format!("cannot read config file {}", path.display()), e)
        })?;
        Self::from_kv(&text)
    }

    /// Parse settings from `key=value` text. See [`Settings::from_file`].
    pub fn from_kv(text: &str) -> Result<Self> {
        let mut settings = Self::default();
        for (idx, line) in text.lines().enumerate() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            match key {
                "ip" => settings.server.host = value.to_string(),
                "port" => settings.server.port = parse_value(key, value, idx)?,
                "username" => settings.server.username = value.to_string(),
                "password" => settings.server.password = value.to_string(),
                "dbname" => settings.server.database = value.to_string(),
                "initsize" => settings.pool.init_size = parse_value(key, value, idx)?,
                "maxSize" => settings.pool.max_size = parse_value(key, value, idx)?,
                "maxIdleTime" => {
                    settings.pool.max_idle = Duration::from_secs(parse_value(key, value, idx)?);
                }
                "connectionTimeout" => {
                    settings.pool.acquire_timeout =
                        Duration::from_millis(parse_value(key, value, idx)?);
                }
                other => {
                    tracing::debug!(key = other, line = idx + 1, "ignoring unrecognized config key");
                }
            }
        }
        settings.pool.validate()?;
        Ok(settings)
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str, idx: usize) -> Result<T> {
    value.parse().map_err(|_| {
        Error::configuration(format!(
            "invalid value for {key} on line {}: {value:?}",
            idx + 1
        ))
    })
}
