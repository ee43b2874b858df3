//! RAII guard for borrowed connections

use std::sync::Arc;

use crate::connector::Connector;
use crate::pool::Shared;

/// Exclusive handle to one borrowed connection.
///
/// Dereferences to the connection so callers use the backing driver's API
/// directly. When the guard is dropped the connection goes back to the
/// idle queue with a fresh idle timestamp; there is no "give back" call
/// to forget, and a double release is unrepresentable. Use
/// [`PooledConn::detach`] to take the connection out of the pool instead.
pub struct PooledConn<C: Connector> {
    conn: Option<C::Connection>,
    shared: Arc<Shared<C>>,
}

impl<C: Connector> PooledConn<C> {
    pub(crate) fn new(conn: C::Connection, shared: Arc<Shared<C>>) -> Self {
        Self {
            conn: Some(conn),
            shared,
        }
    }

    /// Take the connection out of the pool permanently.
    ///
    /// The pool stops counting it, and the producer may create a
    /// replacement on demand.
    #[must_use]
    pub fn detach(mut self) -> C::Connection {
        let conn = self.conn.take().expect("guard already consumed");
        self.shared.discard_slot();
        conn
    }
}

impl<C: Connector> std::ops::Deref for PooledConn<C> {
    type Target = C::Connection;

    fn deref(&self) -> &C::Connection {
        self.conn.as_ref().expect("guard already consumed")
    }
}

impl<C: Connector> std::ops::DerefMut for PooledConn<C> {
    fn deref_mut(&mut self) -> &mut C::Connection {
        self.conn.as_mut().expect("guard already consumed")
    }
}

impl<C: Connector> Drop for PooledConn<C> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.shared.return_idle(conn);
        }
    }
}

impl<C: Connector> std::fmt::Debug for PooledConn<C>
where
    C::Connection: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConn").field("conn", &self.conn).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::PoolConfig;
    use crate::error::Result;
    use crate::pool::Pool;

    fn pool_of_one() -> Pool<impl crate::Connector<Connection = String>> {
        let connector = || -> Result<String> { Ok("conn".to_string()) };
        let config = PoolConfig {
            init_size: 1,
            max_size: 1,
            acquire_timeout: Duration::from_millis(100),
            ..PoolConfig::default()
        };
        Pool::new(connector, config).unwrap()
    }

    #[test]
    fn deref_reaches_the_connection() {
        let pool = pool_of_one();
        let conn = pool.acquire().unwrap();
        assert_eq!(conn.as_str(), "conn");
        drop(conn);
        pool.shutdown();
    }

    #[test]
    fn deref_mut_reaches_the_connection() {
        let pool = pool_of_one();
        let mut conn = pool.acquire().unwrap();
        conn.push_str("-used");
        drop(conn);
        let conn = pool.acquire().unwrap();
        assert_eq!(conn.as_str(), "conn-used");
        drop(conn);
        pool.shutdown();
    }

    #[test]
    fn drop_returns_the_connection() {
        let pool = pool_of_one();
        {
            let _conn = pool.acquire().unwrap();
            assert_eq!(pool.stats().idle, 0);
        }
        let stats = pool.stats();
        assert_eq!(stats.idle, 1);
        assert_eq!(stats.total_releases, 1);
        pool.shutdown();
    }

    #[test]
    fn detach_removes_the_connection_from_the_pool() {
        let pool = pool_of_one();
        let conn = pool.acquire().unwrap();
        // Stop the producer first so it cannot replenish the detached slot
        // underneath the assertions.
        pool.shutdown();
        let raw = conn.detach();
        assert_eq!(raw, "conn");
        let stats = pool.stats();
        assert_eq!(stats.live, 0);
        assert_eq!(stats.total_releases, 0);
    }
}
