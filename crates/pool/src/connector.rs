//! The connector trait: how the pool opens and closes backing connections.

use crate::error::Result;

/// Supplies the open/close capability for one kind of backing connection.
///
/// The pool calls `connect` when it grows and `disconnect` when it shrinks;
/// it never interprets the connection's protocol-level semantics. Idle-time
/// bookkeeping is handled by the pool itself, so a connection type carries
/// no pool-specific state.
pub trait Connector: Send + Sync + 'static {
    /// The connection type produced by this connector.
    type Connection: Send + 'static;

    /// Open a new backing connection.
    fn connect(&self) -> Result<Self::Connection>;

    /// Close a connection that is permanently leaving the pool.
    ///
    /// The default implementation simply drops it, which is sufficient for
    /// connection types that close their session on drop.
    fn disconnect(&self, conn: Self::Connection) {
        drop(conn);
    }
}

/// Any `Fn() -> Result<C>` factory is a connector. Handy for tests and for
/// wrapping connection types that need no shared setup state.
impl<C, F> Connector for F
where
    C: Send + 'static,
    F: Fn() -> Result<C> + Send + Sync + 'static,
{
    type Connection = C;

    fn connect(&self) -> Result<C> {
        self()
    }
}
