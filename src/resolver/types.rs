use anyhow::Result;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::{Record, RecordType};
use hickory_resolver::TokioResolver;

/// What an upstream said about a query.
///
/// Negative answers (NXDOMAIN, NODATA) are answers too: `code` carries the upstream
/// response code and `authorities` its SOA, if any.
#[derive(Debug, Clone)]
pub struct Answer {
    pub code: ResponseCode,
    pub answers: Vec<Record>,
    pub authorities: Vec<Record>,
    /// URL of the upstream that produced the answer
    pub upstream: String,
}

/// Abstract upstream resolver for mocking and switching implementations.
#[async_trait::async_trait]
pub trait DnsResolver: Send + Sync {
    /// Errors only when no upstream produced an answer at all.
    async fn resolve(&self, name: &str, query_type: RecordType) -> Result<Answer>;
}

pub struct Upstream {
    pub url: String,
    pub resolver: TokioResolver,
}
