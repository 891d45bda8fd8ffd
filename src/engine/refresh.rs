use super::fingerprint::Fingerprint;
use super::registry::SubscriptionRegistry;
use super::store::MembershipStore;
use super::traits::{FetchedList, ListFetcher};
use crate::error::FetchError;
use futures::{stream, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Outcome of one refresh cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    /// Subscriptions fetched successfully.
    pub fetched: usize,
    /// Fetched, but with the same fingerprint as last time.
    pub unchanged: usize,
    /// Fetched with a new fingerprint; their domains were merged.
    pub updated: usize,
    /// Fetches that failed and will be retried next tick.
    pub failed: usize,
    /// Domains that were not yet in the store.
    pub merged: usize,
    /// The cycle stopped early because the loop was cancelled.
    pub cancelled: bool,
}

/// Periodically pulls every subscription and merges changed lists into the store.
pub struct RefreshLoop {
    fetcher: Arc<dyn ListFetcher>,
    registry: Arc<SubscriptionRegistry>,
    store: Arc<MembershipStore>,
    interval: Duration,
    concurrent_downloads: usize,
    has_run: AtomicBool,
}

impl RefreshLoop {
    pub fn new(
        fetcher: Arc<dyn ListFetcher>,
        registry: Arc<SubscriptionRegistry>,
        store: Arc<MembershipStore>,
        interval: Duration,
        concurrent_downloads: usize,
    ) -> Self {
        Self {
            fetcher,
            registry,
            store,
            interval,
            concurrent_downloads: concurrent_downloads.max(1),
            has_run: AtomicBool::new(false),
        }
    }

    /// Runs until `cancel` fires. The first cycle starts immediately unless an earlier
    /// [`RefreshLoop::tick`] fetched at least one list, in which case it waits one interval.
    pub async fn run(&self, cancel: CancellationToken) {
        let start = if self.has_run.load(Ordering::Acquire) {
            Instant::now() + self.interval
        } else {
            Instant::now()
        };
        let mut interval = time::interval_at(start, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            let report = self.tick_until(&cancel).await;
            if report.cancelled {
                break;
            }
        }

        info!("Blacklist refresh loop stopped");
    }

    /// Runs a single cycle to completion.
    pub async fn tick(&self) -> RefreshReport {
        self.tick_until(&CancellationToken::new()).await
    }

    async fn tick_until(&self, cancel: &CancellationToken) -> RefreshReport {
        let snapshot = self.registry.snapshot();
        debug!("Refreshing {} subscriptions", snapshot.len());

        let fetcher = self.fetcher.clone();
        let mut results = stream::iter(snapshot)
            .map(|(url, stored)| {
                let fetcher = fetcher.clone();
                async move {
                    let result = fetcher.fetch(&url).await;
                    (url, stored, result)
                }
            })
            .buffer_unordered(self.concurrent_downloads);

        let mut report = RefreshReport::default();
        let mut batch = Vec::new();

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    report.cancelled = true;
                    break;
                }
                next = results.next() => next,
            };
            let Some((url, stored, result)) = next else {
                break;
            };

            if let Some(domains) = self.apply(&url, stored, result, &mut report) {
                batch.extend(domains);
            }
        }

        // Fingerprints of updated subscriptions are already recorded, so their domains
        // are merged even when the cycle was cut short.
        if !batch.is_empty() {
            report.merged = self.store.merge(&batch);
        }
        if report.fetched > 0 {
            self.has_run.store(true, Ordering::Release);
        }

        info!(
            "Blacklist refresh: {} updated, {} unchanged, {} failed, {} new domains ({} total)",
            report.updated,
            report.unchanged,
            report.failed,
            report.merged,
            self.store.len()
        );

        report
    }

    fn apply(
        &self,
        url: &str,
        stored: Option<Fingerprint>,
        result: Result<FetchedList, FetchError>,
        report: &mut RefreshReport,
    ) -> Option<Vec<String>> {
        let list = match result {
            Ok(list) => list,
            Err(e) => {
                warn!("Failed to update subscription ({}): {}", url, e);
                report.failed += 1;
                return None;
            }
        };
        report.fetched += 1;

        if stored == Some(list.fingerprint) {
            debug!("Subscription unchanged: {}", url);
            report.unchanged += 1;
            return None;
        }

        self.registry.update_fingerprint(url, list.fingerprint);
        info!(
            "Blacklist subscription updated: {} ({} entries, {})",
            url,
            list.domains.len(),
            list.fingerprint
        );
        report.updated += 1;
        Some(list.domains)
    }
}
