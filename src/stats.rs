use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::{self, Duration};
use tracing::info;

/// Lock-free query counters, periodically dumped to the log.
#[derive(Debug, Default)]
pub struct StatsCollector {
    total_queries: AtomicU64,
    blocked_queries: AtomicU64,
    forwarded_queries: AtomicU64,
    failed_queries: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub total: u64,
    pub blocked: u64,
    pub forwarded: u64,
    pub failed: u64,
}

impl StatsCollector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Spawns the background dumper. Must be called from within a Tokio runtime.
    pub fn spawn_logger(self: Arc<Self>, log_interval: Duration) {
        tokio::spawn(async move {
            self.run_logger(log_interval).await;
        });
    }

    pub fn inc_queries(&self) {
        self.total_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_blocked(&self) {
        self.blocked_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_forwarded(&self) {
        self.forwarded_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failed(&self) {
        self.failed_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total: self.total_queries.load(Ordering::Relaxed),
            blocked: self.blocked_queries.load(Ordering::Relaxed),
            forwarded: self.forwarded_queries.load(Ordering::Relaxed),
            failed: self.failed_queries.load(Ordering::Relaxed),
        }
    }

    async fn run_logger(&self, log_interval: Duration) {
        let mut interval = time::interval(log_interval);
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.dump_stats();
        }
    }

    fn dump_stats(&self) {
        let s = self.snapshot();
        info!(
            "STATS DUMP: Total: {}, Blocked: {} ({:.1}%), Forwarded: {}, Failed: {}",
            s.total,
            s.blocked,
            if s.total > 0 {
                (s.blocked as f64 / s.total as f64) * 100.0
            } else {
                0.0
            },
            s.forwarded,
            s.failed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = StatsCollector::new();
        stats.inc_queries();
        stats.inc_queries();
        stats.inc_blocked();
        stats.inc_forwarded();

        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                total: 2,
                blocked: 1,
                forwarded: 1,
                failed: 0,
            }
        );
    }
}
