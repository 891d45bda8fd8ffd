use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, UdpSocket};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

use blacklist_dns::config::Config;
use blacklist_dns::init::{init_blacklist, setup_logging};
use blacklist_dns::server::DnsHandler;
use blacklist_dns::stats::StatsCollector;
use hickory_server::ServerFuture;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load Config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config_exists = std::path::Path::new(&config_path).exists();
    let config = if config_exists {
        Config::load(&config_path).await?
    } else {
        Config::default()
    };

    // 2. Setup Logging
    setup_logging(&config);
    info!("Starting blacklist-dns...");
    if !config_exists {
        info!("Config file not found, using defaults.");
    }

    // 3. Init Stats
    let stats = StatsCollector::new();
    if config.stats.enable {
        stats.clone().spawn_logger(Duration::from_secs(config.stats.log_interval_seconds));
    }

    // 4. Subscribe & optionally sync before serving
    let blacklist = init_blacklist(&config).await?;

    // 5. Spawn the refresh loop
    let shutdown = CancellationToken::new();
    let watcher = tokio::spawn({
        let blacklist = blacklist.clone();
        let shutdown = shutdown.clone();
        async move { blacklist.watch(shutdown).await }
    });

    // 6. Init Upstream Resolver
    let resolver = blacklist_dns::resolver::create_resolver(&config, stats.clone())?;

    // 7. Start Server
    let handler = DnsHandler::new(&config, blacklist, resolver, stats);
    let mut server = ServerFuture::new(handler);
    let addr = SocketAddr::new(config.host.parse()?, config.port);

    // UDP
    let udp_socket = UdpSocket::bind(addr).await?;
    server.register_socket(udp_socket);

    // TCP
    let tcp_listener = TcpListener::bind(addr).await?;
    server.register_listener(tcp_listener, Duration::from_secs(5));

    info!("DNS Server listening on {}", addr);

    // 8. Graceful Shutdown
    tokio::select! {
        _ = server.block_until_done() => {},
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received.");
        }
    }

    shutdown.cancel();
    let _ = watcher.await;

    Ok(())
}
