//! Error types for pool operations
use std::time::Duration;

use thiserror::Error;

/// Result type for pool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type covering configuration, connection setup, and acquisition.
#[derive(Error, Debug)]
pub enum Error {
    /// Pool or server configuration is invalid or could not be loaded
    #[error("configuration error: {message}")]
    Configuration {
        /// The error message
        message: String,
        /// The underlying error (if available)
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Opening a backing connection failed
    #[error("connect failed: {reason}")]
    Connect {
        /// The failure reason
        reason: String,
        /// The underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No connection became available within the acquisition timeout
    #[error("timed out after {timeout_ms}ms waiting for a connection ({in_use}/{max_size} in use)")]
    AcquireTimeout {
        /// The configured timeout in milliseconds
        timeout_ms: u64,
        /// Connections checked out when the timeout elapsed
        in_use: usize,
        /// Maximum pool size
        max_size: usize,
    },

    /// The pool has been shut down
    #[error("pool is shut down")]
    Closed,

    /// OS-level failure while starting a pool worker thread
    #[error("runtime error: {message}")]
    Runtime {
        /// The error message
        message: String,
        /// The underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with an underlying cause
    pub fn configuration_with<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a connect error
    pub fn connect<S: Into<String>>(reason: S) -> Self {
        Self::Connect {
            reason: reason.into(),
            source: None,
        }
    }

    /// Create a connect error with an underlying cause
    pub fn connect_with<S, E>(reason: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connect {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an acquisition timeout error
    pub fn acquire_timeout(timeout: Duration, in_use: usize, max_size: usize) -> Self {
        Self::AcquireTimeout {
            timeout_ms: timeout.as_millis() as u64,
            in_use,
            max_size,
        }
    }

    /// Create a runtime error with an underlying cause
    pub fn runtime_with<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Runtime {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Check if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AcquireTimeout { .. } | Self::Connect { .. })
    }
}
