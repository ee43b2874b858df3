//! # Cistern Pool
//!
//! A bounded pool of reusable backing connections shared by many consumer
//! threads. The pool keeps a live set of idle connections ready, grows
//! lazily under load up to a configured ceiling, shrinks back down when
//! idle, and hands connections out through an RAII guard that returns them
//! automatically.
//!
//! The pool is generic over a [`Connector`], which supplies the open/close
//! capability for the backing connection; everything protocol-level stays
//! on the connection type itself.

pub mod config;
pub mod connector;
pub mod error;
pub mod guard;
pub mod pool;

pub use config::{PoolConfig, ServerConfig, Settings};
pub use connector::Connector;
pub use error::{Error, Result};
pub use guard::PooledConn;
pub use pool::{Pool, PoolStats};
