//! Error types for subscription fetching.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that abort a single subscription fetch.
///
/// None of these are fatal: the refresh loop logs them and retries the
/// subscription on its next tick.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS or timeout failure before a response was received.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with something other than 200 OK.
    #[error("unexpected response status code: {0}")]
    Status(StatusCode),

    /// The body could not be read or decoded after a 200 response.
    #[error("failed to read response body: {0}")]
    Read(#[source] std::io::Error),
}
