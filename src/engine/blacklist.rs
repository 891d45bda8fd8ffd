use super::fetcher::HttpFetcher;
use super::filter::{blockable_question, QueryView};
use super::refresh::{RefreshLoop, RefreshReport};
use super::registry::SubscriptionRegistry;
use super::store::MembershipStore;
use super::traits::ListFetcher;
use crate::config::UpdateConfig;
use crate::error::FetchError;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Tuning for the background refresh.
#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub interval: Duration,
    pub concurrent_downloads: usize,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(600),
            concurrent_downloads: 1,
        }
    }
}

impl From<&UpdateConfig> for RefreshSettings {
    fn from(config: &UpdateConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_minutes.max(1) * 60),
            concurrent_downloads: config.concurrent_downloads,
        }
    }
}

/// Subscription-fed domain blacklist.
///
/// Owns the subscription registry and the membership store; the refresh loop started by
/// [`Blacklist::watch`] fills the store while [`Blacklist::is_blocked`] reads it.
pub struct Blacklist {
    registry: Arc<SubscriptionRegistry>,
    store: Arc<MembershipStore>,
    refresher: RefreshLoop,
}

impl Blacklist {
    pub fn new(fetcher: Arc<dyn ListFetcher>, settings: RefreshSettings) -> Self {
        let registry = Arc::new(SubscriptionRegistry::new());
        let store = Arc::new(MembershipStore::new());
        let refresher = RefreshLoop::new(
            fetcher,
            registry.clone(),
            store.clone(),
            settings.interval,
            settings.concurrent_downloads,
        );

        Self {
            registry,
            store,
            refresher,
        }
    }

    /// Builds a blacklist that fetches over HTTP with the configured client settings.
    pub fn from_config(config: &UpdateConfig) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::from_config(config)?;
        Ok(Self::new(Arc::new(fetcher), RefreshSettings::from(config)))
    }

    /// Registers a remote list. Subscribing twice to the same URL is a no-op.
    pub fn subscribe(&self, url: impl Into<String>) {
        let url = url.into();
        if self.registry.add(url.clone()) {
            info!("Subscribed to blacklist {}", url);
        }
    }

    /// Runs one refresh cycle now.
    pub async fn refresh(&self) -> RefreshReport {
        self.refresher.tick().await
    }

    /// Refreshes every subscription periodically until `cancel` fires.
    pub async fn watch(&self, cancel: CancellationToken) {
        self.refresher.run(cancel).await
    }

    /// Decides whether a query should be sinkholed.
    pub fn is_blocked<Q: QueryView + ?Sized>(&self, query: &Q) -> bool {
        let Some(question) = blockable_question(query) else {
            return false;
        };

        let blocked = self.store.contains(&question.name);
        if blocked {
            info!(target: "blacklist", "blocked {}", question.name);
        }
        blocked
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.store.contains(domain)
    }

    pub fn domain_count(&self) -> usize {
        self.store.len()
    }

    pub fn subscription_count(&self) -> usize {
        self.registry.len()
    }
}
