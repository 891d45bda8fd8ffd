//! DNS sinkhole fed by remotely hosted blocklist subscriptions.
//!
//! The [`engine`] module holds the blacklist itself: subscriptions are fetched over HTTP,
//! fingerprinted, parsed and merged into an append-only membership store that the DNS
//! handler in [`server`] consults for every query.

pub mod config;
pub mod engine;
pub mod error;
pub mod init;
pub mod resolver;
pub mod server;
pub mod stats;
