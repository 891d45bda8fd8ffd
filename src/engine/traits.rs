use super::fingerprint::Fingerprint;
use crate::error::FetchError;

/// A subscription body after parsing, together with the digest of its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedList {
    pub domains: Vec<String>,
    pub fingerprint: Fingerprint,
}

/// The "Control Plane" source of blocklist content.
///
/// Implementations must return either a fully parsed list with its fingerprint or an
/// error, never a partial list. Dropping the returned future aborts the fetch.
#[async_trait::async_trait]
pub trait ListFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedList, FetchError>;
}
