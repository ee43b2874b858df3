//! Concurrent insert benchmark over the shared pool.
//!
//! Expects a `cistern.conf` in the working directory (or a path in
//! `CISTERN_CONFIG`) pointing at a server with a table like:
//!
//! ```sql
//! CREATE TABLE user (name VARCHAR(50), age INT, sex ENUM('male', 'female'));
//! ```
//!
//! Four worker threads share the pool and hammer it with inserts; the
//! elapsed time shows what connection reuse buys over per-query connects.

use std::thread;
use std::time::Instant;

use mysql::prelude::Queryable;

const WORKERS: usize = 4;
const INSERTS_PER_WORKER: usize = 2500;

fn main() -> cistern_pool::Result<()> {
    tracing_subscriber::fmt().init();

    // Fail fast (and predictably) if the settings file is unusable.
    cistern_mysql::global()?;

    let started = Instant::now();
    let workers: Vec<_> = (0..WORKERS)
        .map(|_| {
            thread::spawn(|| {
                for _ in 0..INSERTS_PER_WORKER {
                    let mut conn = cistern_mysql::acquire().expect("acquire from shared pool");
                    conn.exec_drop(
                        "INSERT INTO user (name, age, sex) VALUES (?, ?, ?)",
                        ("zhang san", 20, "male"),
                    )
                    .expect("insert");
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().expect("worker thread");
    }

    let elapsed = started.elapsed();
    let total = WORKERS * INSERTS_PER_WORKER;
    println!("{total} inserts across {WORKERS} threads in {elapsed:?}");
    println!("final pool stats: {:?}", cistern_mysql::global()?.stats());

    Ok(())
}
