//! Live connection tracking.
//!
//! Every connection holds a [`ConnectionGuard`] for its whole lifetime. Creating the guard
//! registers the connection, dropping it deregisters the connection and runs the idle
//! check, so teardown is accounted for whichever way the connection ends.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use dashmap::DashMap;
use tokio::sync::Notify;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::{debug, trace};

use crate::server::{ServerStats, StatsSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// What the registry knows about a live connection.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub id: ConnectionId,
    pub peer: Option<SocketAddr>,
    pub since: Instant,
}

#[derive(Debug)]
pub struct ConnectionRegistry {
    live: DashMap<ConnectionId, ConnectionInfo>,
    stats: ServerStats,
    next_id: AtomicU64,
    shutdown: CancellationToken,
    idle: Notify,
}

impl ConnectionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            live: DashMap::new(),
            stats: ServerStats::default(),
            next_id: AtomicU64::new(1),
            shutdown: CancellationToken::new(),
            idle: Notify::new(),
        })
    }

    /// Adds a connection to the live set. It stays there until the guard is dropped.
    pub fn register(self: &Arc<Self>, peer: Option<SocketAddr>) -> ConnectionGuard {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.live.insert(id, ConnectionInfo { id, peer, since: Instant::now() });
        self.stats.connection_opened();
        trace!(connection = %id, ?peer, "connection registered");

        ConnectionGuard { registry: Arc::clone(self), id, stop: self.shutdown.child_token() }
    }

    fn deregister(&self, id: ConnectionId) {
        if self.live.remove(&id).is_some() {
            self.stats.connection_closed();
            trace!(connection = %id, "connection deregistered");
        }
        self.maybe_idle();
    }

    /// Wakes [`wait_idle`](Self::wait_idle) callers once no connection is left.
    pub fn maybe_idle(&self) {
        if self.live.is_empty() {
            debug!("no live connection left");
            self.idle.notify_waiters();
        }
    }

    /// Resolves once the live set is empty.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.live.is_empty() {
                return;
            }
            notified.await;
        }
    }

    /// Asks every live connection, and every connection registered later, to stop
    /// reading new requests. Replies already queued are still written.
    pub fn shutdown(&self) {
        debug!(live = self.live.len(), "shutdown requested");
        self.shutdown.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub fn note_request_served(&self) {
        self.stats.request_served();
    }

    pub fn note_read_error(&self) {
        self.stats.read_error();
    }

    pub fn note_respond_error(&self) {
        self.stats.respond_error();
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn connections(&self) -> Vec<ConnectionInfo> {
        let mut connections: Vec<_> = self.live.iter().map(|entry| entry.value().clone()).collect();
        connections.sort_by_key(|info| info.id);
        connections
    }

    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

/// Registration of one connection; dropping it deregisters the connection.
#[derive(Debug)]
pub struct ConnectionGuard {
    registry: Arc<ConnectionRegistry>,
    id: ConnectionId,
    stop: CancellationToken,
}

impl ConnectionGuard {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Resolves when this connection should stop reading requests, either because the
    /// registry is shutting down or because [`stop`](Self::stop) was called.
    pub fn stopped(&self) -> WaitForCancellationFuture<'_> {
        self.stop.cancelled()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    pub fn stop(&self) {
        self.stop.cancel();
    }

    pub fn note_request_served(&self) {
        self.registry.note_request_served();
    }

    pub fn note_read_error(&self) {
        self.registry.note_read_error();
    }

    pub fn note_respond_error(&self) {
        self.registry.note_respond_error();
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.registry.deregister(self.id);
    }
}
