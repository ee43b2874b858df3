//! The process-wide pool instance.
//!
//! Built on first access and shared by every caller for the remaining
//! lifetime of the process. Construction is fatal-soft: if the settings
//! file cannot be loaded the instance is recorded as unusable and every
//! later access fails with the same configuration error instead of
//! aborting anything.

use std::path::PathBuf;
use std::sync::OnceLock;

use cistern_pool::{Error, Pool, PooledConn, Result, Settings};

use crate::connector::MySqlConnector;

/// Environment variable that overrides the settings file location.
pub const CONFIG_ENV: &str = "CISTERN_CONFIG";

/// Default settings file, resolved relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "cistern.conf";

static GLOBAL: OnceLock<std::result::Result<Pool<MySqlConnector>, String>> = OnceLock::new();

fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

fn build() -> std::result::Result<Pool<MySqlConnector>, String> {
    let path = config_path();
    let settings = Settings::from_file(&path).map_err(|error| {
        tracing::error!(path = %path.display(), %error, "pool settings failed to load, pool is disabled");
        error.to_string()
    })?;
    let connector = MySqlConnector::new(&settings.server);
    Pool::new(connector, settings.pool).map_err(|error| {
        tracing::error!(%error, "pool construction failed, pool is disabled");
        error.to_string()
    })
}

/// The shared pool, constructed on first call.
///
/// Seeds `initsize` connections and starts the producer and reaper
/// threads, which then run for the life of the process. When construction
/// failed, every call reports the original failure.
pub fn global() -> Result<&'static Pool<MySqlConnector>> {
    match GLOBAL.get_or_init(build) {
        Ok(pool) => Ok(pool),
        Err(message) => Err(Error::configuration(message.clone())),
    }
}

/// Borrow a connection from the shared pool, waiting up to the configured
/// acquisition timeout.
pub fn acquire() -> Result<PooledConn<MySqlConnector>> {
    global()?.acquire()
}
