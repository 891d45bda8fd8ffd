//! Initialization helpers for the application startup.

use crate::config::Config;
use crate::engine::Blacklist;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Sets up the tracing subscriber with the configured filters.
pub fn setup_logging(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = config.logging.level.clone();

        // Suppress hickory_server logs unless explicitly enabled/overridden
        if !filter.contains("hickory_server") {
            filter.push_str(",hickory_server=off");
        }
        // Also suppress hickory_proto if not set
        if !filter.contains("hickory_proto") {
            filter.push_str(",hickory_proto=off");
        }
        if !config.logging.log_blocked && !filter.contains("blacklist=") {
            filter.push_str(",blacklist=warn");
        }

        tracing_subscriber::EnvFilter::new(filter)
    });

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Builds the blacklist, subscribes every configured list and optionally waits for the
/// first refresh so that queries are filtered from the moment the server starts.
pub async fn init_blacklist(config: &Config) -> Result<Arc<Blacklist>> {
    let blacklist =
        Blacklist::from_config(&config.updates).context("Failed to build HTTP client")?;

    let subscriptions = config
        .collect_subscriptions()
        .await
        .context("Failed to read subscriptions list")?;
    if subscriptions.is_empty() {
        warn!("No blacklist subscriptions configured; nothing will be blocked.");
    }
    for url in subscriptions {
        blacklist.subscribe(url);
    }

    if config.updates.initial_sync {
        info!("Fetching {} subscriptions before serving...", blacklist.subscription_count());
        let report = blacklist.refresh().await;
        info!(
            "Initial sync complete: {} domains from {} lists ({} failed)",
            blacklist.domain_count(),
            report.updated,
            report.failed
        );
    }

    Ok(Arc::new(blacklist))
}
