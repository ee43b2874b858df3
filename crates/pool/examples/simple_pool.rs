//! Simple pooling example
//!
//! Demonstrates pool construction, borrowing through the RAII guard, and
//! the statistics snapshot, using a simulated connection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use cistern_pool::{Connector, Pool, PoolConfig, Result};

/// Simulates a backing connection that takes a moment to establish.
struct DemoConnector {
    next_id: AtomicU64,
}

impl Connector for DemoConnector {
    type Connection = String;

    fn connect(&self) -> Result<String> {
        thread::sleep(Duration::from_millis(50));
        Ok(format!("connection-{}", self.next_id.fetch_add(1, Ordering::SeqCst)))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    println!("=== Simple Pool Example ===\n");

    let config = PoolConfig {
        init_size: 2,
        max_size: 10,
        max_idle: Duration::from_secs(60),
        acquire_timeout: Duration::from_secs(5),
        ..PoolConfig::default()
    };

    let connector = DemoConnector {
        next_id: AtomicU64::new(0),
    };
    let pool = Pool::new(connector, config)?;

    println!("Pool created with:");
    println!("  - Init size: 2");
    println!("  - Max size: 10\n");

    println!("Acquiring connection...");
    let conn = pool.acquire()?;
    println!("  Connection acquired: {}\n", *conn);

    let stats = pool.stats();
    println!("Pool statistics:");
    println!("  - In use: {}", stats.in_use);
    println!("  - Idle: {}", stats.idle);
    println!("  - Total acquisitions: {}", stats.total_acquisitions);

    // Release the connection by dropping the guard
    drop(conn);

    let final_stats = pool.stats();
    println!("\nFinal statistics:");
    println!("  - In use: {}", final_stats.in_use);
    println!("  - Idle: {}", final_stats.idle);
    println!("  - Total releases: {}", final_stats.total_releases);

    pool.shutdown();
    println!("\n=== Example completed! ===");

    Ok(())
}
