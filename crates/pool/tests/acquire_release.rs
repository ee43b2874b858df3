//! Borrow/return round-trip behavior

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use cistern_pool::{Connector, Error, Pool, PoolConfig, Result};

struct TestConnector {
    next_id: AtomicU64,
}

impl TestConnector {
    fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
        }
    }
}

impl Connector for TestConnector {
    type Connection = u64;

    fn connect(&self) -> Result<u64> {
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

/// A pool where the producer can never add connections, so counts are
/// fully deterministic.
fn fixed_pool(size: usize) -> Pool<TestConnector> {
    let config = PoolConfig {
        init_size: size,
        max_size: size,
        acquire_timeout: Duration::from_millis(200),
        ..PoolConfig::default()
    };
    Pool::new(TestConnector::new(), config).unwrap()
}

#[test]
fn round_trip_keeps_live_count_stable() {
    let pool = fixed_pool(2);

    {
        let _conn = pool.acquire().expect("first acquire should succeed");
        let stats = pool.stats();
        assert_eq!(stats.live, 2);
        assert_eq!(stats.in_use, 1);
        assert_eq!(stats.idle, 1);
    }

    let stats = pool.stats();
    assert_eq!(stats.live, 2);
    assert_eq!(stats.in_use, 0);
    assert_eq!(stats.idle, 2);
    assert_eq!(stats.total_acquisitions, 1);
    assert_eq!(stats.total_releases, 1);

    // Acquire again after the release: no net change to the live set.
    let _conn = pool.acquire().expect("reacquire should succeed");
    assert_eq!(pool.stats().live, 2);
    assert_eq!(pool.stats().created, 2);
    drop(_conn);
    pool.shutdown();
}

#[test]
fn released_connection_is_reused() {
    let pool = fixed_pool(1);

    let first = pool.acquire().unwrap();
    let first_id = *first;
    drop(first);

    let second = pool.acquire().unwrap();
    assert_eq!(*second, first_id);
    assert_eq!(pool.stats().created, 1);
    drop(second);
    pool.shutdown();
}

#[test]
fn try_acquire_never_blocks() {
    let pool = fixed_pool(1);

    let held = pool.try_acquire().expect("idle connection available");
    assert!(pool.try_acquire().is_none(), "pool is empty while borrowed");

    drop(held);
    assert!(pool.try_acquire().is_some(), "released connection reusable");

    pool.shutdown();
    assert!(pool.try_acquire().is_none(), "no connections after shutdown");
}

#[test]
fn acquire_after_shutdown_fails_fast() {
    let pool = fixed_pool(1);
    pool.shutdown();
    let err = pool.acquire().unwrap_err();
    assert!(matches!(err, Error::Closed));
}

#[test]
fn release_after_shutdown_closes_the_connection() {
    let pool = fixed_pool(1);
    let conn = pool.acquire().unwrap();

    pool.shutdown();
    assert_eq!(pool.stats().live, 1, "borrowed connection still counted");

    drop(conn);
    let stats = pool.stats();
    assert_eq!(stats.live, 0);
    assert_eq!(stats.idle, 0);
    assert_eq!(stats.destroyed, 1);
    assert_eq!(stats.total_releases, 1);
}
