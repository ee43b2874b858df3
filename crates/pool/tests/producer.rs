//! Producer loop behavior: lazy growth and connect-failure resilience

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use cistern_pool::{Connector, Error, Pool, PoolConfig, Result};

/// Fails the first `failures` connect attempts, then succeeds forever.
struct FlakyConnector {
    next_id: AtomicU64,
    failures_left: AtomicU64,
}

impl FlakyConnector {
    fn new(failures: u64) -> Self {
        Self {
            next_id: AtomicU64::new(0),
            failures_left: AtomicU64::new(failures),
        }
    }
}

impl Connector for FlakyConnector {
    type Connection = u64;

    fn connect(&self) -> Result<u64> {
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(Error::connect("injected connect failure"));
        }
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[test]
fn empty_pool_grows_on_demand() {
    let config = PoolConfig {
        init_size: 0,
        max_size: 2,
        acquire_timeout: Duration::from_secs(1),
        ..PoolConfig::default()
    };
    let pool = Pool::new(FlakyConnector::new(0), config).unwrap();
    assert_eq!(pool.stats().live, 0);

    let conn = pool.acquire().expect("producer should top up on demand");
    assert_eq!(pool.stats().in_use, 1);
    drop(conn);
    pool.shutdown();
}

#[test]
fn producer_survives_connect_failures() {
    let config = PoolConfig {
        init_size: 0,
        max_size: 1,
        acquire_timeout: Duration::from_secs(2),
        retry_delay: Duration::from_millis(20),
        ..PoolConfig::default()
    };
    let pool = Pool::new(FlakyConnector::new(3), config).unwrap();

    // Three attempts fail before one sticks; the loop must not die.
    let conn = pool.acquire().expect("producer should retry until connected");
    assert_eq!(*conn, 0);
    assert_eq!(pool.stats().created, 1);
    drop(conn);
    pool.shutdown();
}

#[test]
fn seed_failures_are_not_fatal() {
    let config = PoolConfig {
        init_size: 2,
        max_size: 2,
        acquire_timeout: Duration::from_secs(2),
        retry_delay: Duration::from_millis(20),
        ..PoolConfig::default()
    };
    // Both seed connects fail; construction still succeeds and the
    // producer makes up the shortfall.
    let pool = Pool::new(FlakyConnector::new(2), config).unwrap();

    let conn = pool.acquire().expect("pool should recover after failed seeding");
    drop(conn);
    let stats = pool.stats();
    assert!(stats.created >= 1);
    assert!(stats.live <= 2);
    pool.shutdown();
}
