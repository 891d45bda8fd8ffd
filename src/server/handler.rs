//! DNS request handler.
//!
//! Every request goes through the same steps:
//! 1. Query parsing
//! 2. Blacklist check (sinkhole on match)
//! 3. Upstream resolution

use crate::config::{BlockResponse, Config};
use crate::engine::Blacklist;
use crate::resolver::DnsResolver;
use crate::stats::StatsCollector;
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::proto::op::{Header, ResponseCode};
use hickory_server::proto::rr::{
    rdata::{A, AAAA},
    Name, RData, Record, RecordType,
};
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use super::types::QueryContext;

/// TTL of synthesized sinkhole answers.
const BLOCKED_TTL: u32 = 60;

/// Answers DNS queries, sinkholing those on the blacklist.
#[derive(Clone)]
pub struct DnsHandler {
    block_response: BlockResponse,
    log_forwarded: bool,
    blacklist: Arc<Blacklist>,
    resolver: Arc<dyn DnsResolver>,
    stats: Arc<StatsCollector>,
}

impl DnsHandler {
    pub fn new(
        config: &Config,
        blacklist: Arc<Blacklist>,
        resolver: Arc<dyn DnsResolver>,
        stats: Arc<StatsCollector>,
    ) -> Self {
        Self {
            block_response: config.block_response,
            log_forwarded: config.logging.log_forwarded,
            blacklist,
            resolver,
            stats,
        }
    }

    fn query_context(request: &Request) -> Option<QueryContext> {
        let query = request.queries().first()?;
        Some(QueryContext {
            name: Name::from(query.name().clone()),
            qtype: query.query_type(),
            start: Instant::now(),
        })
    }

    /// Sends a response with the given code and answers.
    async fn respond<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
        code: ResponseCode,
        answers: &[Record],
        authorities: &[Record],
    ) -> ResponseInfo {
        let mut header = Header::response_from_request(request.header());
        header.set_authoritative(false);
        header.set_recursion_available(true);
        header.set_response_code(code);

        let builder = MessageResponseBuilder::from_message_request(request);
        let response = builder.build(header, answers.iter(), authorities.iter(), &[], &[]);
        match response_handle.send_response(response).await {
            Ok(info) => info,
            Err(e) => {
                error!("Failed to send response to {}: {}", request.src(), e);
                let mut header = Header::response_from_request(request.header());
                header.set_response_code(ResponseCode::ServFail);
                header.into()
            }
        }
    }

    /// Answers a blacklisted query according to the configured block response.
    async fn serve_blocked<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
        query: QueryContext,
    ) -> ResponseInfo {
        self.stats.inc_blocked();

        match self.block_response {
            BlockResponse::NullIp => {
                let rdata = match query.qtype {
                    RecordType::AAAA => RData::AAAA(AAAA(Ipv6Addr::UNSPECIFIED)),
                    _ => RData::A(A(Ipv4Addr::UNSPECIFIED)),
                };
                let record = Record::from_rdata(query.name, BLOCKED_TTL, rdata);
                self.respond(
                    request,
                    response_handle,
                    ResponseCode::NoError,
                    std::slice::from_ref(&record),
                    &[],
                )
                .await
            }
            BlockResponse::Refused => {
                self.respond(request, response_handle, ResponseCode::Refused, &[], &[])
                    .await
            }
            BlockResponse::NxDomain => {
                self.respond(request, response_handle, ResponseCode::NXDomain, &[], &[])
                    .await
            }
        }
    }

    async fn resolve_and_serve<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
        query: QueryContext,
    ) -> ResponseInfo {
        match self
            .resolver
            .resolve(&query.name.to_string(), query.qtype)
            .await
        {
            Ok(answer) => {
                if self.log_forwarded {
                    info!(
                        target: "dns_query",
                        client = %request.src().ip(),
                        domain = %query.name,
                        r#type = %query.qtype,
                        upstream = %answer.upstream,
                        rcode = %answer.code,
                        lat = query.start.elapsed().as_millis() as u64,
                        "forwarded"
                    );
                }
                self.respond(
                    request,
                    response_handle,
                    answer.code,
                    &answer.answers,
                    &answer.authorities,
                )
                .await
            }
            Err(e) => {
                error!("Upstream resolution failed for {}: {}", query.name, e);
                self.stats.inc_failed();
                self.respond(request, response_handle, ResponseCode::ServFail, &[], &[])
                    .await
            }
        }
    }
}

#[async_trait::async_trait]
impl RequestHandler for DnsHandler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
    ) -> ResponseInfo {
        self.stats.inc_queries();

        let Some(query) = Self::query_context(request) else {
            return self
                .respond(request, response_handle, ResponseCode::FormErr, &[], &[])
                .await;
        };

        if self.blacklist.is_blocked(request) {
            return self.serve_blocked(request, response_handle, query).await;
        }

        self.resolve_and_serve(request, response_handle, query)
            .await
    }
}
