//! # Cistern MySQL
//!
//! The MySQL backing for [`cistern_pool`]: a [`Connector`] implementation
//! over the synchronous `mysql` driver, plus the lazily-constructed,
//! process-wide pool instance configured from a `key=value` file.
//!
//! Borrowed connections deref to [`mysql::Conn`], so queries and updates
//! use the driver API directly and driver errors reach the caller
//! unchanged.
//!
//! [`Connector`]: cistern_pool::Connector

pub mod connector;
pub mod global;

pub use connector::MySqlConnector;
pub use global::{CONFIG_ENV, DEFAULT_CONFIG_FILE, acquire, global};

// Re-export the driver so callers can name its types without adding a
// direct dependency.
pub use mysql;
