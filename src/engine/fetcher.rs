use super::fingerprint::Fingerprint;
use super::traits::{FetchedList, ListFetcher};
use crate::config::UpdateConfig;
use crate::error::FetchError;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, StatusCode};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::io::StreamReader;
use tracing::debug;

/// Hosts-file addresses whose entries are reduced to their trailing domain.
const SINKHOLE_PREFIXES: [&str; 2] = ["0.0.0.0", "127.0.0.1"];

/// Fetches subscription lists over HTTP.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &UpdateConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()?;
        Ok(Self::new(client))
    }
}

/// Parses one line of a subscription list.
///
/// Supports plain domain lists and hosts-file entries pointing at a sinkhole address.
pub fn parse_line(line: &str) -> Option<String> {
    let line = line.trim();
    // Skip comments and empty lines
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    for prefix in SINKHOLE_PREFIXES {
        if let Some(rest) = line.strip_prefix(prefix) {
            if rest.starts_with(char::is_whitespace) {
                return rest.split_whitespace().last().map(str::to_string);
            }
        }
    }

    Some(line.to_string())
}

pub fn parse_list(text: &str) -> Vec<String> {
    text.lines().filter_map(parse_line).collect()
}

#[async_trait::async_trait]
impl ListFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedList, FetchError> {
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if status != StatusCode::OK {
            // Drain so the connection can go back to the pool
            if let Err(e) = resp.bytes().await {
                debug!("Failed to drain response body from {}: {}", url, e);
            }
            return Err(FetchError::Status(status));
        }

        let mut hasher = Sha256::new();
        let mut domains = Vec::new();
        {
            let stream = resp
                .bytes_stream()
                .inspect_ok(|chunk| hasher.update(chunk))
                .map(|result| result.map_err(std::io::Error::other));
            let mut reader = BufReader::new(StreamReader::new(stream));
            let mut buf = Vec::new();

            // Lists are not guaranteed to be UTF-8; undecodable bytes become U+FFFD
            loop {
                buf.clear();
                let read = reader
                    .read_until(b'\n', &mut buf)
                    .await
                    .map_err(FetchError::Read)?;
                if read == 0 {
                    break;
                }
                if let Some(domain) = parse_line(&String::from_utf8_lossy(&buf)) {
                    domains.push(domain);
                }
            }
        }

        let fingerprint = Fingerprint::from_hasher(hasher);
        debug!("Fetched {} entries from {} ({})", domains.len(), url, fingerprint);

        Ok(FetchedList {
            domains,
            fingerprint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blocklist_mixed_format() {
        let content = "# ad hosts\n\nexample.com\n0.0.0.0 ads.example.com\n127.0.0.1 tracker.example.com\n";

        assert_eq!(
            parse_list(content),
            vec!["example.com", "ads.example.com", "tracker.example.com"]
        );
    }

    #[test]
    fn test_parse_hosts_prefix() {
        assert_eq!(
            parse_line("0.0.0.0 ads.example.com").as_deref(),
            Some("ads.example.com")
        );
        assert_eq!(
            parse_line("127.0.0.1 ads.example.com").as_deref(),
            Some("ads.example.com")
        );
        assert_eq!(
            parse_line("0.0.0.0\t  spaced.example.com  ").as_deref(),
            Some("spaced.example.com")
        );
    }

    #[test]
    fn test_parse_skips_indented_comments() {
        assert_eq!(parse_line("   # comment"), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line(""), None);
        assert_eq!(
            parse_line("  plain.example.com  ").as_deref(),
            Some("plain.example.com")
        );
    }

    #[test]
    fn test_parse_prefix_needs_whitespace() {
        // Not a hosts entry, kept verbatim
        assert_eq!(
            parse_line("0.0.0.0.example.com").as_deref(),
            Some("0.0.0.0.example.com")
        );
        assert_eq!(parse_line("0.0.0.0").as_deref(), Some("0.0.0.0"));
    }

    #[test]
    fn test_parse_keeps_duplicates() {
        let entries = parse_list("a.com\na.com\n0.0.0.0 a.com\n");
        assert_eq!(entries, vec!["a.com", "a.com", "a.com"]);
    }
}
