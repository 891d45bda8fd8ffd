use super::types::{Answer, DnsResolver, Upstream};
use crate::stats::StatsCollector;
use anyhow::Result;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::proto::ProtoErrorKind;
use hickory_resolver::ResolveError;
use std::sync::Arc;
use tracing::warn;

/// Tries each upstream in configuration order until one answers.
pub struct SequentialResolver {
    pub(crate) upstreams: Vec<Upstream>,
    pub(crate) stats: Arc<StatsCollector>,
}

impl SequentialResolver {
    pub fn new(upstreams: Vec<Upstream>, stats: Arc<StatsCollector>) -> Self {
        Self { upstreams, stats }
    }
}

/// Turns a negative upstream response into an answer; `None` for real failures.
fn negative_answer(e: &ResolveError, upstream: &str) -> Option<Answer> {
    match e.proto()?.kind() {
        ProtoErrorKind::NoRecordsFound {
            response_code, soa, ..
        } => Some(Answer {
            code: *response_code,
            answers: Vec::new(),
            authorities: soa
                .iter()
                .map(|soa| (**soa).clone().into_record_of_rdata())
                .collect(),
            upstream: upstream.to_string(),
        }),
        _ => None,
    }
}

#[async_trait::async_trait]
impl DnsResolver for SequentialResolver {
    async fn resolve(&self, name: &str, query_type: RecordType) -> Result<Answer> {
        for upstream in &self.upstreams {
            match upstream.resolver.lookup(name, query_type).await {
                Ok(lookup) => {
                    self.stats.inc_forwarded();
                    return Ok(Answer {
                        code: ResponseCode::NoError,
                        answers: lookup.records().to_vec(),
                        authorities: Vec::new(),
                        upstream: upstream.url.clone(),
                    });
                }
                Err(e) => {
                    // NXDOMAIN / NODATA is the upstream's answer, not a failure
                    if let Some(answer) = negative_answer(&e, &upstream.url) {
                        self.stats.inc_forwarded();
                        return Ok(answer);
                    }
                    warn!("Upstream {} failed for {}: {}", upstream.url, name, e);
                }
            }
        }
        Err(anyhow::anyhow!("All upstreams failed for {}", name))
    }
}
