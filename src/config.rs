use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_upstream_servers")]
    pub upstream_servers: Vec<String>,

    #[serde(default = "default_upstream_timeout_ms")]
    pub upstream_timeout_ms: u64,

    /// Blacklist URLs subscribed in addition to those in `subscriptions_file`.
    #[serde(default)]
    pub subscriptions: Vec<String>,

    #[serde(default)]
    pub subscriptions_file: Option<PathBuf>,

    #[serde(default)]
    pub block_response: BlockResponse,

    #[serde(default)]
    pub updates: UpdateConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub stats: StatsConfig,
}

/// How a blocked A/AAAA query is answered.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlockResponse {
    /// `0.0.0.0` for A, `::` for AAAA.
    #[default]
    NullIp,
    Refused,
    NxDomain,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpdateConfig {
    #[serde(default = "default_update_interval")]
    pub interval_minutes: u64,
    #[serde(default = "default_concurrent_downloads")]
    pub concurrent_downloads: usize,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Fetch every subscription once before the server starts answering.
    #[serde(default = "default_initial_sync")]
    pub initial_sync: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_blocked")]
    pub log_blocked: bool,
    #[serde(default)]
    pub log_forwarded: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StatsConfig {
    #[serde(default = "default_stats_enable")]
    pub enable: bool,
    #[serde(default = "default_log_interval")]
    pub log_interval_seconds: u64,
}

// Defaults
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    53
}
fn default_upstream_servers() -> Vec<String> {
    vec!["udp://1.1.1.1:53".to_string()]
}
fn default_upstream_timeout_ms() -> u64 {
    2000
}
fn default_update_interval() -> u64 {
    10
}
fn default_concurrent_downloads() -> usize {
    1
}
fn default_fetch_timeout() -> u64 {
    30
}
fn default_initial_sync() -> bool {
    true
}
fn default_user_agent() -> String {
    concat!("blacklist-dns/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_blocked() -> bool {
    true
}
fn default_stats_enable() -> bool {
    true
}
fn default_log_interval() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            upstream_servers: default_upstream_servers(),
            upstream_timeout_ms: default_upstream_timeout_ms(),
            subscriptions: vec![],
            subscriptions_file: None,
            block_response: BlockResponse::default(),
            updates: UpdateConfig::default(),
            logging: LoggingConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_update_interval(),
            concurrent_downloads: default_concurrent_downloads(),
            fetch_timeout_secs: default_fetch_timeout(),
            initial_sync: default_initial_sync(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_blocked: default_log_blocked(),
            log_forwarded: false,
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enable: default_stats_enable(),
            log_interval_seconds: default_log_interval(),
        }
    }
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents).context("Failed to parse config TOML")?;
        Ok(config)
    }

    /// All subscription URLs: the file's entries first, then the inline list.
    pub async fn collect_subscriptions(&self) -> Result<Vec<String>> {
        let mut urls = match &self.subscriptions_file {
            Some(path) => read_subscriptions(path).await?,
            None => Vec::new(),
        };
        urls.extend(self.subscriptions.iter().cloned());
        Ok(urls)
    }
}

/// Reads a subscription list: one URL per line, `#` comments and blank lines ignored.
pub async fn read_subscriptions(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read subscriptions list {}", path.display()))?;
    Ok(parse_subscriptions(&contents))
}

fn parse_subscriptions(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
