pub mod sequential;
pub mod types;

use crate::config::Config;
use crate::stats::StatsCollector;
use anyhow::{Context, Result};
use hickory_resolver::config::{NameServerConfig, ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::Resolver;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{error, info};
use url::Url;

pub use self::sequential::SequentialResolver;
pub use self::types::{Answer, DnsResolver, Upstream};

/// Builds the upstream resolver from `upstream_servers`.
///
/// Entries that fail to parse are logged and skipped; it is an error if none remain.
pub fn create_resolver(config: &Config, stats: Arc<StatsCollector>) -> Result<Arc<dyn DnsResolver>> {
    let mut upstreams = Vec::new();
    for (idx, upstream_url) in config.upstream_servers.iter().enumerate() {
        match create_upstream(config, upstream_url) {
            Ok(upstream) => {
                info!("Added upstream: [{}] {}", idx, upstream_url);
                upstreams.push(upstream);
            }
            Err(e) => error!("Skipping upstream {}: {:#}", upstream_url, e),
        }
    }

    if upstreams.is_empty() {
        return Err(anyhow::anyhow!("No valid upstreams available"));
    }

    Ok(Arc::new(SequentialResolver::new(upstreams, stats)) as Arc<dyn DnsResolver>)
}

/// Parses `udp://ip[:port]`, `tcp://ip[:port]` or a bare `ip[:port]` (UDP).
pub fn parse_upstream(upstream_url: &str) -> Result<(SocketAddr, Protocol)> {
    if let Ok(addr) = upstream_url.parse::<SocketAddr>() {
        return Ok((addr, Protocol::Udp));
    }
    if let Ok(ip) = upstream_url.parse::<IpAddr>() {
        return Ok((SocketAddr::new(ip, 53), Protocol::Udp));
    }

    let url = Url::parse(upstream_url).context("Failed to parse upstream URL")?;
    let protocol = match url.scheme() {
        "udp" => Protocol::Udp,
        "tcp" => Protocol::Tcp,
        other => return Err(anyhow::anyhow!("Unsupported upstream scheme '{}'", other)),
    };

    let host = url.host_str().context("Upstream URL has no host")?;
    let ip: IpAddr = host
        .trim_start_matches('[')
        .trim_end_matches(']')
        .parse()
        .with_context(|| format!("Upstream host '{}' is not an IP address", host))?;

    Ok((SocketAddr::new(ip, url.port().unwrap_or(53)), protocol))
}

fn create_upstream(config: &Config, upstream_url: &str) -> Result<Upstream> {
    let (socket_addr, protocol) = parse_upstream(upstream_url)?;

    let mut resolver_config = ResolverConfig::new();
    resolver_config.add_name_server(NameServerConfig::new(socket_addr, protocol));

    let mut opts = ResolverOpts::default();
    opts.cache_size = 0;
    opts.timeout = std::time::Duration::from_millis(config.upstream_timeout_ms);

    let resolver =
        Resolver::builder_with_config(resolver_config, TokioConnectionProvider::default())
            .with_options(opts)
            .build();

    Ok(Upstream {
        url: upstream_url.to_string(),
        resolver,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upstream_forms() {
        let (addr, proto) = parse_upstream("udp://1.1.1.1:53").unwrap();
        assert_eq!(addr, "1.1.1.1:53".parse::<SocketAddr>().unwrap());
        assert_eq!(proto, Protocol::Udp);

        let (addr, proto) = parse_upstream("tcp://9.9.9.9").unwrap();
        assert_eq!(addr, "9.9.9.9:53".parse::<SocketAddr>().unwrap());
        assert_eq!(proto, Protocol::Tcp);

        let (addr, _) = parse_upstream("8.8.8.8:5353").unwrap();
        assert_eq!(addr.port(), 5353);

        let (addr, _) = parse_upstream("tcp://[2606:4700:4700::1111]:53").unwrap();
        assert!(addr.is_ipv6());
    }

    #[test]
    fn test_parse_upstream_rejects_unsupported() {
        assert!(parse_upstream("https://dns.google/dns-query").is_err());
        assert!(parse_upstream("udp://dns.google:53").is_err());
        assert!(parse_upstream("not an upstream").is_err());
    }
}
