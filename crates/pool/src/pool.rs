//! The bounded pool: idle queue, live-count accounting, timeout-bound
//! acquisition, and the producer/reaper background loops.
//!
//! All shared state lives behind a single mutex. One condvar (`signal`)
//! carries both wakeup reasons of the borrow protocol ("a connection is
//! available" for consumers, "the queue drained" for the producer), so
//! every waiter re-checks its own predicate in a loop after waking. A
//! second condvar on the same mutex gives the reaper a timed sleep that a
//! shutdown can interrupt.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::config::PoolConfig;
use crate::connector::Connector;
use crate::error::{Error, Result};
use crate::guard::PooledConn;

// ---------------------------------------------------------------------------
// Pool internals
// ---------------------------------------------------------------------------

/// An idle-queue entry: the connection plus the moment it was last returned.
struct Entry<T> {
    conn: T,
    idle_since: Instant,
}

impl<T> Entry<T> {
    fn new(conn: T) -> Self {
        Self {
            conn,
            idle_since: Instant::now(),
        }
    }

    fn idle_for(&self) -> Duration {
        self.idle_since.elapsed()
    }
}

/// Event counters, updated under the state mutex.
#[derive(Default)]
struct Counters {
    created: u64,
    destroyed: u64,
    acquired: u64,
    released: u64,
    timeouts: u64,
}

/// Everything guarded by the pool mutex.
///
/// Invariants: `idle.len() <= live <= config.max_size`; a connection is
/// either in `idle`, held by exactly one guard, or in flight between the
/// two, never more than one of these at a time.
struct State<T> {
    idle: VecDeque<Entry<T>>,
    /// Total connections currently existing (idle + borrowed), including
    /// slots the producer has reserved while a connect is in flight.
    live: usize,
    shutdown: bool,
    counters: Counters,
}

pub(crate) struct Shared<C: Connector> {
    connector: C,
    config: PoolConfig,
    state: Mutex<State<C::Connection>>,
    /// Consumers wait here for a non-empty queue; the producer waits here
    /// for an empty one. Always `notify_all`, predicates re-checked by
    /// every waiter.
    signal: Condvar,
    /// Timed sleep for the reaper; notified only on shutdown.
    reaper_tick: Condvar,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl<C: Connector> Shared<C> {
    /// Re-insert a borrowed connection at the back of the idle queue with a
    /// fresh idle timestamp, then wake all waiters. Called from guard drop,
    /// typically on a consumer thread.
    pub(crate) fn return_idle(&self, conn: C::Connection) {
        let mut state = self.state.lock();
        state.counters.released += 1;
        if state.shutdown {
            state.live -= 1;
            state.counters.destroyed += 1;
            drop(state);
            self.connector.disconnect(conn);
            return;
        }
        state.idle.push_back(Entry::new(conn));
        drop(state);
        self.signal.notify_all();
    }

    /// Account for a connection leaving the pool for good via
    /// [`PooledConn::detach`]. The producer is woken so it can replenish.
    pub(crate) fn discard_slot(&self) {
        let mut state = self.state.lock();
        state.live -= 1;
        state.counters.destroyed += 1;
        drop(state);
        self.signal.notify_all();
    }
}

// ---------------------------------------------------------------------------
// PoolStats
// ---------------------------------------------------------------------------

/// Pool statistics snapshot.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Total connections currently existing (idle + borrowed).
    pub live: usize,
    /// Connections currently sitting in the idle queue.
    pub idle: usize,
    /// Connections currently checked out.
    pub in_use: usize,
    /// Total connections ever created.
    pub created: u64,
    /// Total connections ever destroyed.
    pub destroyed: u64,
    /// Total successful acquisitions.
    pub total_acquisitions: u64,
    /// Total releases back to the pool.
    pub total_releases: u64,
    /// Total acquisitions that failed on timeout.
    pub timeouts: u64,
}

// ---------------------------------------------------------------------------
// Pool<C>
// ---------------------------------------------------------------------------

/// A bounded, thread-safe connection pool.
///
/// Cheap to clone; all clones share the same state. Connections are handed
/// out as [`PooledConn`] guards that return themselves on drop. A producer
/// thread grows the pool one connection at a time while the idle queue is
/// empty and the live count is below `max_size`; a reaper thread shrinks it
/// back toward `init_size` by closing connections that sat idle longer than
/// `max_idle`.
pub struct Pool<C: Connector> {
    shared: Arc<Shared<C>>,
}

impl<C: Connector> Clone for Pool<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C: Connector> std::fmt::Debug for Pool<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool").field("stats", &self.stats()).finish()
    }
}

impl<C: Connector> Pool<C> {
    /// Create a pool, seed `init_size` connections, and start the producer
    /// and reaper threads.
    ///
    /// Seed connects that fail are logged and skipped: the pool starts
    /// smaller and the producer makes up the shortfall on demand. An
    /// invalid configuration is rejected up front.
    pub fn new(connector: C, config: PoolConfig) -> Result<Self> {
        config.validate()?;

        let mut idle = VecDeque::with_capacity(config.max_size);
        for _ in 0..config.init_size {
            match connector.connect() {
                Ok(conn) => idle.push_back(Entry::new(conn)),
                Err(error) => {
                    tracing::warn!(error = %error, "seed connect failed, starting with a smaller initial set");
                }
            }
        }
        let live = idle.len();
        let created = live as u64;
        tracing::debug!(seeded = live, requested = config.init_size, "pool seeded");

        let shared = Arc::new(Shared {
            connector,
            config,
            state: Mutex::new(State {
                idle,
                live,
                shutdown: false,
                counters: Counters {
                    created,
                    ..Counters::default()
                },
            }),
            signal: Condvar::new(),
            reaper_tick: Condvar::new(),
            workers: Mutex::new(Vec::new()),
        });

        let producer = spawn_worker("cistern-producer", &shared, run_producer)?;
        let reaper = match spawn_worker("cistern-reaper", &shared, run_reaper) {
            Ok(handle) => handle,
            Err(error) => {
                // Unwind the producer we already started.
                shared.state.lock().shutdown = true;
                shared.signal.notify_all();
                let _ = producer.join();
                return Err(error);
            }
        };
        shared.workers.lock().extend([producer, reaper]);

        Ok(Self { shared })
    }

    /// Borrow a connection, waiting up to the configured `acquire_timeout`.
    pub fn acquire(&self) -> Result<PooledConn<C>> {
        self.acquire_timeout(self.shared.config.acquire_timeout)
    }

    /// Borrow a connection, waiting up to `timeout`.
    ///
    /// While the idle queue is empty the caller blocks on the pool signal,
    /// bounded by the remaining budget; every wake re-checks the queue, so
    /// spurious wakeups and races with other consumers are harmless. There
    /// is no fairness between waiters: any of them may win when a
    /// connection is returned.
    pub fn acquire_timeout(&self, timeout: Duration) -> Result<PooledConn<C>> {
        let shared = &self.shared;
        let deadline = Instant::now() + timeout;

        let mut state = shared.state.lock();
        let entry = loop {
            if state.shutdown {
                return Err(Error::Closed);
            }
            if let Some(entry) = state.idle.pop_front() {
                break entry;
            }
            if Instant::now() >= deadline {
                state.counters.timeouts += 1;
                let in_use = state.live - state.idle.len();
                return Err(Error::acquire_timeout(timeout, in_use, shared.config.max_size));
            }
            shared.signal.wait_until(&mut state, deadline);
        };
        state.counters.acquired += 1;
        drop(state);

        // The queue may have just drained; let the producer decide whether
        // to top up, and let other consumers re-check.
        shared.signal.notify_all();

        Ok(PooledConn::new(entry.conn, Arc::clone(shared)))
    }

    /// Borrow a connection without blocking. Returns `None` when the idle
    /// queue is empty or the pool has shut down.
    pub fn try_acquire(&self) -> Option<PooledConn<C>> {
        let mut state = self.shared.state.lock();
        if state.shutdown {
            return None;
        }
        let entry = state.idle.pop_front()?;
        state.counters.acquired += 1;
        drop(state);
        self.shared.signal.notify_all();
        Some(PooledConn::new(entry.conn, Arc::clone(&self.shared)))
    }

    /// Get a current statistics snapshot.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let state = self.shared.state.lock();
        PoolStats {
            live: state.live,
            idle: state.idle.len(),
            in_use: state.live - state.idle.len(),
            created: state.counters.created,
            destroyed: state.counters.destroyed,
            total_acquisitions: state.counters.acquired,
            total_releases: state.counters.released,
            timeouts: state.counters.timeouts,
        }
    }

    /// Shut the pool down: wake everything, stop both background loops,
    /// join them, and close all idle connections. Idempotent. Outstanding
    /// guards stay usable; their connections are closed when dropped.
    pub fn shutdown(&self) {
        let shared = &self.shared;
        let drained = {
            let mut state = shared.state.lock();
            if state.shutdown {
                return;
            }
            state.shutdown = true;
            let drained: Vec<_> = state.idle.drain(..).collect();
            state.live -= drained.len();
            state.counters.destroyed += drained.len() as u64;
            drained
        };
        shared.signal.notify_all();
        shared.reaper_tick.notify_all();

        let workers: Vec<_> = shared.workers.lock().drain(..).collect();
        for handle in workers {
            let _ = handle.join();
        }
        for entry in drained {
            shared.connector.disconnect(entry.conn);
        }
        tracing::debug!("pool shut down");
    }
}

fn spawn_worker<C: Connector>(
    name: &str,
    shared: &Arc<Shared<C>>,
    body: fn(&Shared<C>),
) -> Result<JoinHandle<()>> {
    let shared = Arc::clone(shared);
    std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || body(&shared))
        .map_err(|e| Error::runtime_with(format!("failed to spawn {name} thread"), e))
}

// ---------------------------------------------------------------------------
// Producer loop
// ---------------------------------------------------------------------------

/// Create connections while the idle queue is empty and `live < max_size`;
/// sleep whenever the queue is non-empty. A failed connect releases the
/// reserved slot, logs, and paces the next attempt with `retry_delay`; the
/// loop itself never dies on connect errors.
fn run_producer<C: Connector>(shared: &Shared<C>) {
    loop {
        let mut state = shared.state.lock();
        while !state.idle.is_empty() && !state.shutdown {
            shared.signal.wait(&mut state);
        }
        if state.shutdown {
            break;
        }
        if state.live >= shared.config.max_size {
            // At capacity with an empty queue: deliberate backpressure.
            // Wait for a release, a detach, or shutdown.
            shared.signal.wait(&mut state);
            continue;
        }

        // Reserve the slot so the cap holds while we connect off-lock.
        state.live += 1;
        drop(state);

        match shared.connector.connect() {
            Ok(conn) => {
                let mut state = shared.state.lock();
                if state.shutdown {
                    state.live -= 1;
                    drop(state);
                    shared.connector.disconnect(conn);
                    break;
                }
                state.counters.created += 1;
                state.idle.push_back(Entry::new(conn));
                drop(state);
                shared.signal.notify_all();
            }
            Err(error) => {
                tracing::warn!(error = %error, "connect attempt failed, will retry");
                let mut state = shared.state.lock();
                state.live -= 1;
                if state.shutdown {
                    break;
                }
                shared.signal.wait_for(&mut state, shared.config.retry_delay);
                if state.shutdown {
                    break;
                }
            }
        }
    }
    tracing::debug!("producer loop stopped");
}

// ---------------------------------------------------------------------------
// Reaper loop
// ---------------------------------------------------------------------------

/// Once per scan interval, close connections that sat idle for `max_idle`
/// or longer, stopping at `init_size`. The queue is oldest-idle-first, so
/// the scan ends at the first entry below the threshold: O(reaped), not
/// O(queue).
fn run_reaper<C: Connector>(shared: &Shared<C>) {
    let interval = shared.config.effective_reap_interval();
    loop {
        let expired = {
            let mut state = shared.state.lock();
            if state.shutdown {
                break;
            }
            shared.reaper_tick.wait_for(&mut state, interval);
            if state.shutdown {
                break;
            }

            let mut expired = Vec::new();
            while state.live > shared.config.init_size
                && state
                    .idle
                    .front()
                    .is_some_and(|entry| entry.idle_for() >= shared.config.max_idle)
            {
                if let Some(entry) = state.idle.pop_front() {
                    state.live -= 1;
                    state.counters.destroyed += 1;
                    expired.push(entry.conn);
                }
            }
            expired
        };

        if !expired.is_empty() {
            tracing::debug!(count = expired.len(), "reaping connections idle past max_idle");
            for conn in expired {
                shared.connector.disconnect(conn);
            }
        }
    }
    tracing::debug!("reaper loop stopped");
}
