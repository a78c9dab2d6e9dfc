//! The wire prober: a stub resolver pointed at one or more recursive,
//! DNSSEC-validating nameservers.
//!
//! Per-query semantics mirror a classic stub resolver: servers are
//! tried in order under one shared deadline. A server that times out is
//! skipped for this round and retried while lifetime remains; a server
//! that answers SERVFAIL/REFUSED/NOTIMP (or unparseable garbage) is
//! unusable for this query. When every server is unusable the query
//! fails as `NoNameservers`; when the lifetime runs out it fails as
//! `Timeout`. The distinction matters: the decision engine resolves
//! those two failures to opposite policy outcomes.

use crate::dns::message_builder::MessageBuilder;
use crate::dns::response_parser::{DnsAnswer, ResponseParser};
use crate::dns::transport;
use async_trait::async_trait;
use dane_policyd_application::ports::DnsProber;
use dane_policyd_domain::{DomainError, MxHost, TlsaLookup};
use hickory_proto::rr::{Name, RecordType};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, warn};

/// Pause between retry rounds when every server timed out, so a dead
/// network does not turn into a busy loop.
const RETRY_ROUND_DELAY: Duration = Duration::from_millis(100);

enum QueryFailure {
    Timeout,
    NoNameservers,
    Failed(String),
}

/// Failure of one attempt against one server.
enum AttemptFailure {
    Timeout,
    Failed(String),
}

impl From<QueryFailure> for DomainError {
    fn from(failure: QueryFailure) -> Self {
        match failure {
            QueryFailure::Timeout => DomainError::QueryTimeout,
            QueryFailure::NoNameservers => DomainError::NoNameservers,
            QueryFailure::Failed(reason) => DomainError::InvalidDnsResponse(reason),
        }
    }
}

/// Process-wide resolver instance. Nameservers are frozen at
/// construction, before the first worker starts; nothing mutates them
/// afterwards.
pub struct WireProber {
    nameservers: Vec<SocketAddr>,
}

impl WireProber {
    pub fn new(nameservers: Vec<SocketAddr>) -> Self {
        Self { nameservers }
    }

    pub fn nameservers(&self) -> &[SocketAddr] {
        &self.nameservers
    }

    /// Issue one query under an overall lifetime, walking the
    /// configured nameservers until a usable answer (NOERROR or
    /// NXDOMAIN) arrives.
    async fn query(
        &self,
        name: &Name,
        record_type: RecordType,
        lifetime: Duration,
    ) -> Result<DnsAnswer, QueryFailure> {
        if self.nameservers.is_empty() {
            return Err(QueryFailure::NoNameservers);
        }

        let (id, query_bytes) = MessageBuilder::build_query(name, record_type)
            .map_err(|e| QueryFailure::Failed(e.to_string()))?;

        let deadline = Instant::now() + lifetime;

        loop {
            let mut saw_timeout = false;

            for &server in &self.nameservers {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(QueryFailure::Timeout);
                }

                match self
                    .query_one(server, id, &query_bytes, remaining)
                    .await
                {
                    Ok(answer) => return Ok(answer),
                    Err(AttemptFailure::Timeout) => {
                        debug!(server = %server, name = %name, "Nameserver timed out");
                        saw_timeout = true;
                    }
                    Err(AttemptFailure::Failed(reason)) => {
                        debug!(server = %server, name = %name, reason = %reason, "Nameserver unusable");
                    }
                }
            }

            if !saw_timeout {
                // Every server answered and none was usable. Retrying
                // cannot help.
                return Err(QueryFailure::NoNameservers);
            }

            if deadline.saturating_duration_since(Instant::now()) <= RETRY_ROUND_DELAY {
                return Err(QueryFailure::Timeout);
            }
            sleep(RETRY_ROUND_DELAY).await;
        }
    }

    /// One attempt against one server: UDP, then TCP if truncated.
    async fn query_one(
        &self,
        server: SocketAddr,
        id: u16,
        query_bytes: &[u8],
        remaining: Duration,
    ) -> Result<DnsAnswer, AttemptFailure> {
        let response_bytes = transport::query_udp(server, query_bytes, remaining)
            .await
            .map_err(classify_transport)?;

        let mut answer = ResponseParser::parse(&response_bytes)
            .map_err(|e| AttemptFailure::Failed(e.to_string()))?;

        if answer.id != id {
            return Err(AttemptFailure::Failed(format!(
                "Response ID mismatch: expected {}, got {}",
                id, answer.id
            )));
        }

        if answer.truncated {
            debug!(server = %server, "Response truncated, retrying over TCP");
            let response_bytes = transport::query_tcp(server, query_bytes, remaining)
                .await
                .map_err(classify_transport)?;
            answer = ResponseParser::parse(&response_bytes)
                .map_err(|e| AttemptFailure::Failed(e.to_string()))?;
            if answer.id != id {
                return Err(AttemptFailure::Failed("TCP response ID mismatch".to_string()));
            }
        }

        if answer.is_server_error() {
            return Err(AttemptFailure::Failed(format!(
                "Server error rcode: {:?}",
                answer.rcode
            )));
        }

        Ok(answer)
    }
}

fn classify_transport(error: DomainError) -> AttemptFailure {
    match error {
        DomainError::QueryTimeout => AttemptFailure::Timeout,
        other => AttemptFailure::Failed(other.to_string()),
    }
}

#[async_trait]
impl DnsProber for WireProber {
    async fn lookup_mx(
        &self,
        domain: &str,
        timeout: Duration,
    ) -> Result<Vec<MxHost>, DomainError> {
        let name = MessageBuilder::domain_name(domain)?;
        let answer = self.query(&name, RecordType::MX, timeout).await?;
        if answer.is_nxdomain() {
            return Err(DomainError::NxDomain);
        }
        Ok(answer.mx_hosts)
    }

    async fn lookup_tlsa(&self, hostname: &str, timeout: Duration) -> TlsaLookup {
        let name = match MessageBuilder::tlsa_name(hostname) {
            Ok(name) => name,
            Err(e) => {
                // dnspython raises EmptyLabel before the query is even
                // sent; same bucket as a confirmed-absent name.
                debug!(hostname = %hostname, error = %e, "Unencodable TLSA name");
                return TlsaLookup::NxDomain;
            }
        };

        match self.query(&name, RecordType::TLSA, timeout).await {
            Ok(answer) if answer.is_nxdomain() => TlsaLookup::NxDomain,
            Ok(answer) => TlsaLookup::Records {
                authenticated: answer.authenticated,
                records: answer.tlsa_records,
            },
            Err(QueryFailure::Timeout) => TlsaLookup::Timeout,
            Err(QueryFailure::NoNameservers) => TlsaLookup::NoNameservers,
            Err(QueryFailure::Failed(reason)) => TlsaLookup::Failed(reason),
        }
    }

    async fn probe_dnssec(&self, timeout: Duration) -> Result<bool, DomainError> {
        // The root zone is signed; any validating resolver sets AD on
        // its SOA. No third-party zone dependency.
        let answer = self.query(&Name::root(), RecordType::SOA, timeout).await?;
        if answer.is_server_error() || answer.is_nxdomain() {
            warn!(rcode = ?answer.rcode, "Unexpected rcode probing root SOA");
            return Ok(false);
        }
        Ok(answer.authenticated)
    }
}
