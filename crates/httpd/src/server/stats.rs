use std::sync::atomic::{AtomicU64, Ordering};

/// Aggregate counters of one server.
///
/// Everything except `current_connections` only ever grows.
#[derive(Debug, Default)]
pub struct ServerStats {
    total_connections: AtomicU64,
    current_connections: AtomicU64,
    requests_served: AtomicU64,
    read_errors: AtomicU64,
    respond_errors: AtomicU64,
}

/// A point in time copy of [`ServerStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub total_connections: u64,
    pub current_connections: u64,
    pub requests_served: u64,
    pub read_errors: u64,
    pub respond_errors: u64,
}

impl ServerStats {
    pub fn total_connections(&self) -> u64 {
        self.total_connections.load(Ordering::Relaxed)
    }

    pub fn current_connections(&self) -> u64 {
        self.current_connections.load(Ordering::Acquire)
    }

    pub fn requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::Relaxed)
    }

    pub fn read_errors(&self) -> u64 {
        self.read_errors.load(Ordering::Relaxed)
    }

    pub fn respond_errors(&self) -> u64 {
        self.respond_errors.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_connections: self.total_connections(),
            current_connections: self.current_connections(),
            requests_served: self.requests_served(),
            read_errors: self.read_errors(),
            respond_errors: self.respond_errors(),
        }
    }

    pub(crate) fn connection_opened(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.current_connections.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn connection_closed(&self) {
        self.current_connections.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn request_served(&self) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn read_error(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn respond_error(&self) {
        self.respond_errors.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters() {
        let stats = ServerStats::default();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());

        stats.connection_opened();
        stats.connection_opened();
        stats.request_served();
        stats.read_error();
        stats.respond_error();
        stats.connection_closed();

        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                total_connections: 2,
                current_connections: 1,
                requests_served: 1,
                read_errors: 1,
                respond_errors: 1,
            }
        );
    }
}
