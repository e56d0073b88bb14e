//! Connection pool management.
//!
//! # Responsibilities
//! - Bound live connections globally and per route, atomically
//! - Hand out idle connections before dialing new ones
//! - Block saturated acquires until a slot frees or the deadline passes
//! - Evict idle and expired connections on a periodic sweep
//!
//! # Design Decisions
//! - One mutex guards all counts and idle sets, so caps can never be
//!   over-committed by two racing acquires and the sweep can never evict a
//!   connection that was just handed out
//! - The lock is only held for bookkeeping; dialing happens against a
//!   reserved slot with the lock released
//! - The sweeper holds a weak reference and dies with the pool

use std::collections::{HashMap, VecDeque};
use std::pin::pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use bytes::Bytes;
use http_body_util::Full;
use hyper::client::conn::http1::SendRequest;
use tokio::sync::Notify;
use tokio::time::{self, MissedTickBehavior};

use crate::config::PoolConfig;
use crate::error::{ClientError, ClientResult};
use crate::pool::connection::{Inner, PooledConnection};
use crate::pool::Route;
use crate::transport;

/// Bounded pool of reusable HTTP/1.1 connections keyed by route.
pub struct ConnectionPool {
    shared: Arc<PoolShared>,
    connect_timeout: Duration,
    acquire_timeout: Duration,
}

/// Point-in-time pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Live connections: idle plus checked out plus dialing.
    pub live: usize,
    /// Connections parked in the idle sets.
    pub idle: usize,
}

impl PoolStats {
    /// Connections currently checked out or being dialed.
    pub fn in_flight(&self) -> usize {
        self.live - self.idle
    }
}

pub(crate) struct PoolShared {
    state: Mutex<PoolState>,
    /// Signalled whenever capacity frees or an idle connection is parked.
    slot_freed: Notify,
    max_total: usize,
    max_per_route: usize,
    max_idle: Duration,
}

struct PoolState {
    idle: HashMap<Route, VecDeque<IdleConnection>>,
    /// Live count per route, counting idle, checked out and dialing.
    live: HashMap<Route, usize>,
    total_live: usize,
}

struct IdleConnection {
    sender: SendRequest<Full<Bytes>>,
    created_at: Instant,
    idle_since: Instant,
}

enum Checkout {
    Reuse(IdleConnection),
    Dial,
    Wait,
}

impl ConnectionPool {
    /// Build a pool and start its idle eviction sweeper.
    pub fn new(config: &PoolConfig, connect_timeout: Duration, acquire_timeout: Duration) -> Self {
        let shared = Arc::new(PoolShared {
            state: Mutex::new(PoolState {
                idle: HashMap::new(),
                live: HashMap::new(),
                total_live: 0,
            }),
            slot_freed: Notify::new(),
            max_total: config.max_total_connections,
            max_per_route: config.max_per_route,
            max_idle: Duration::from_secs(config.max_idle_secs),
        });
        spawn_sweeper(&shared, Duration::from_secs(config.sweep_interval_secs));
        Self {
            shared,
            connect_timeout,
            acquire_timeout,
        }
    }

    /// Check out a connection for the route, reusing an idle one when
    /// possible and dialing a new one when below both caps.
    ///
    /// When the pool is saturated the call waits until a slot frees via
    /// release, drop or eviction; past the acquire deadline it fails with
    /// `ConnectionAcquireTimeout`.
    pub async fn acquire(&self, route: &Route) -> ClientResult<PooledConnection> {
        let deadline = time::Instant::now() + self.acquire_timeout;
        loop {
            // Register for slot wakeups before checking capacity. `Notify`
            // stores at most one permit for unregistered waiters, so two
            // releases landing between the check and the await would
            // otherwise coalesce and strand one waiter until its deadline.
            let mut slot_freed = pin!(self.shared.slot_freed.notified());
            slot_freed.as_mut().enable();
            match self.shared.try_checkout(route) {
                Checkout::Reuse(idle) => {
                    tracing::trace!(route = %route, age_ms = idle.created_at.elapsed().as_millis() as u64, "reusing idle connection");
                    return Ok(PooledConnection::new(
                        Arc::clone(&self.shared),
                        route.clone(),
                        idle.sender,
                        idle.created_at,
                    ));
                }
                Checkout::Dial => {
                    // Slot already reserved under the lock; give it back if
                    // the dial fails.
                    match transport::connect(route, self.connect_timeout).await {
                        Ok(sender) => {
                            return Ok(PooledConnection::new(
                                Arc::clone(&self.shared),
                                route.clone(),
                                sender,
                                Instant::now(),
                            ));
                        }
                        Err(err) => {
                            self.shared.discard(route);
                            return Err(err);
                        }
                    }
                }
                Checkout::Wait => {
                    if time::timeout_at(deadline, slot_freed).await.is_err() {
                        tracing::debug!(route = %route, "pool saturated past acquire deadline");
                        return Err(ClientError::ConnectionAcquireTimeout(self.acquire_timeout));
                    }
                }
            }
        }
    }

    /// Return a connection to the idle set for its route. A connection whose
    /// transport has closed is discarded instead, freeing its slot.
    pub fn release(&self, mut connection: PooledConnection) {
        if let Some(inner) = connection.take() {
            self.shared.park(inner);
        }
    }

    /// Current counters, primarily for observability and tests.
    pub fn stats(&self) -> PoolStats {
        self.shared.stats()
    }
}

impl PoolShared {
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_checkout(&self, route: &Route) -> Checkout {
        let mut state = self.lock();

        loop {
            match state.idle.get_mut(route).and_then(VecDeque::pop_front) {
                Some(idle) if idle.sender.is_closed() => {
                    // Server went away while parked; the slot is free again.
                    Self::forget(&mut state, route);
                    self.slot_freed.notify_one();
                }
                Some(idle) => return Checkout::Reuse(idle),
                None => break,
            }
        }

        let per_route = state.live.get(route).copied().unwrap_or(0);
        if state.total_live < self.max_total && per_route < self.max_per_route {
            *state.live.entry(route.clone()).or_insert(0) += 1;
            state.total_live += 1;
            Checkout::Dial
        } else {
            Checkout::Wait
        }
    }

    fn park(&self, inner: Inner) {
        if inner.sender.is_closed() {
            self.discard(&inner.route);
            return;
        }
        let mut state = self.lock();
        state
            .idle
            .entry(inner.route.clone())
            .or_default()
            .push_back(IdleConnection {
                sender: inner.sender,
                created_at: inner.created_at,
                idle_since: Instant::now(),
            });
        drop(state);
        self.slot_freed.notify_one();
    }

    /// Drop a live connection's slot (dial failure, I/O failure, cancel).
    pub(crate) fn discard(&self, route: &Route) {
        let mut state = self.lock();
        Self::forget(&mut state, route);
        drop(state);
        self.slot_freed.notify_one();
    }

    fn forget(state: &mut PoolState, route: &Route) {
        state.total_live = state.total_live.saturating_sub(1);
        if let Some(count) = state.live.get_mut(route) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                state.live.remove(route);
            }
        }
    }

    /// Remove idle connections that have sat past the idle threshold or whose
    /// transport has closed. Runs under the same mutex as acquire, so a
    /// connection just handed to a caller can never be swept.
    pub(crate) fn evict_idle(&self) {
        let mut state = self.lock();
        let max_idle = self.max_idle;
        let mut evicted = 0usize;

        let routes: Vec<Route> = state.idle.keys().cloned().collect();
        for route in routes {
            let removed = match state.idle.get_mut(&route) {
                Some(queue) => {
                    let before = queue.len();
                    queue.retain(|idle| {
                        !idle.sender.is_closed() && idle.idle_since.elapsed() < max_idle
                    });
                    before - queue.len()
                }
                None => 0,
            };
            if state.idle.get(&route).is_some_and(VecDeque::is_empty) {
                state.idle.remove(&route);
            }
            for _ in 0..removed {
                Self::forget(&mut state, &route);
                self.slot_freed.notify_one();
            }
            evicted += removed;
        }

        if evicted > 0 {
            tracing::debug!(evicted, "evicted idle connections");
        }
    }

    fn stats(&self) -> PoolStats {
        let state = self.lock();
        PoolStats {
            live: state.total_live,
            idle: state.idle.values().map(VecDeque::len).sum(),
        }
    }
}

fn spawn_sweeper(shared: &Arc<PoolShared>, interval: Duration) {
    let weak = Arc::downgrade(shared);
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(shared) = weak.upgrade() else { break };
            shared.evict_idle();
        }
        tracing::debug!("idle eviction sweeper stopped");
    });
}
