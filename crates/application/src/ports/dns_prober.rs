use async_trait::async_trait;
use dane_policyd_domain::{DomainError, MxHost, TlsaLookup};
use std::time::Duration;

/// Upstream DNS access, as seen by the decision engine.
///
/// Implemented by the wire client in infrastructure and by mocks in
/// tests. Each call is bounded by the given lifetime; none of them may
/// block indefinitely.
#[async_trait]
pub trait DnsProber: Send + Sync {
    /// Look up the MX records of `domain`. The returned sequence is not
    /// required to be sorted; failures are surfaced as errors and it is
    /// the caller's job to decide what they mean.
    async fn lookup_mx(&self, domain: &str, timeout: Duration)
        -> Result<Vec<MxHost>, DomainError>;

    /// Resolve `_25._tcp.<hostname> IN TLSA` and classify the outcome.
    /// Infallible: every failure mode is a `TlsaLookup` variant the
    /// decision engine must handle explicitly.
    async fn lookup_tlsa(&self, hostname: &str, timeout: Duration) -> TlsaLookup;

    /// Query a well-known DNSSEC-signed zone and report whether the
    /// response carried the Authenticated Data flag.
    async fn probe_dnssec(&self, timeout: Duration) -> Result<bool, DomainError>;
}
