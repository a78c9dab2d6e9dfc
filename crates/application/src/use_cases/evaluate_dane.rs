use crate::ports::DnsProber;
use dane_policyd_domain::{IndeterminateReason, MxHost, TlsaLookup, TlsaVerdict};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The domain-level DANE decision.
///
/// Fetches the MX hosts of a domain and probes each one, in ascending
/// preference order, for a DNSSEC-validated TLSA record. The walk
/// short-circuits on the first host that mandates DANE; a lower-priority
/// host cannot weaken that verdict.
pub struct EvaluateDaneUseCase {
    prober: Arc<dyn DnsProber>,
    query_timeout: Duration,
}

impl EvaluateDaneUseCase {
    pub fn new(prober: Arc<dyn DnsProber>, query_timeout: Duration) -> Self {
        Self {
            prober,
            query_timeout,
        }
    }

    /// Returns true when delivery to `domain` should require
    /// DANE-authenticated TLS.
    pub async fn execute(&self, domain: &str) -> bool {
        for mx in self.mx_records(domain).await {
            let verdict = self.has_dane_record(&mx.hostname).await;
            if verdict.requires_dane() {
                return true;
            }
        }
        false
    }

    /// MX lookup with the "nothing to check" contract: any resolution
    /// failure yields an empty sequence, never an error.
    async fn mx_records(&self, domain: &str) -> Vec<MxHost> {
        match self.prober.lookup_mx(domain, self.query_timeout).await {
            Ok(mut records) => {
                records.sort();
                records
            }
            Err(e) => {
                warn!(domain = %domain, error = %e, "MX lookup failed, nothing to check");
                Vec::new()
            }
        }
    }

    /// Probe one hostname and resolve the five-way lookup outcome into
    /// a verdict. The two Indeterminate arms resolve to opposite policy
    /// outcomes; that asymmetry is a contract (see `TlsaVerdict`).
    async fn has_dane_record(&self, hostname: &str) -> TlsaVerdict {
        match self.prober.lookup_tlsa(hostname, self.query_timeout).await {
            TlsaLookup::Records {
                authenticated,
                records,
            } => {
                if authenticated && records.iter().any(|r| r.is_dane_usable()) {
                    TlsaVerdict::Found
                } else {
                    TlsaVerdict::NotFound
                }
            }
            TlsaLookup::NxDomain => {
                // Expected for hosts without DANE, no log noise.
                debug!(hostname = %hostname, "No TLSA name");
                TlsaVerdict::NotFound
            }
            TlsaLookup::NoNameservers => {
                warn!(
                    hostname = %hostname,
                    "Unable to look up the TLSA record. Is the DNSSEC zone okay on \
                     https://dnsviz.net/d/{}/dnssec/?",
                    hostname
                );
                TlsaVerdict::Indeterminate(IndeterminateReason::ValidationFailure)
            }
            TlsaLookup::Timeout => {
                warn!(
                    hostname = %hostname,
                    timeout_secs = self.query_timeout.as_secs(),
                    "Timeout while resolving the TLSA record"
                );
                TlsaVerdict::Indeterminate(IndeterminateReason::Timeout)
            }
            TlsaLookup::Failed(reason) => {
                // Catch-all stays availability-biased, but is logged
                // distinctly from a confirmed NXDOMAIN.
                info!(hostname = %hostname, reason = %reason, "Error while looking up the TLSA record");
                TlsaVerdict::NotFound
            }
        }
    }
}
