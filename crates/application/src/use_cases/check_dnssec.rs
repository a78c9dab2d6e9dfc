use crate::ports::DnsProber;
use dane_policyd_domain::DomainError;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

/// Startup self-check: refuse to run against a resolver that cannot
/// validate DNSSEC, since every verdict would then degrade to
/// "no DANE".
pub struct CheckDnssecUseCase {
    prober: Arc<dyn DnsProber>,
    probe_timeout: Duration,
}

impl CheckDnssecUseCase {
    pub fn new(prober: Arc<dyn DnsProber>, probe_timeout: Duration) -> Self {
        Self {
            prober,
            probe_timeout,
        }
    }

    pub async fn execute(&self) -> bool {
        match self.prober.probe_dnssec(self.probe_timeout).await {
            Ok(authenticated) => authenticated,
            Err(DomainError::QueryTimeout) => {
                error!(
                    timeout_secs = self.probe_timeout.as_secs(),
                    "Timeout while probing resolver DNSSEC support"
                );
                false
            }
            Err(e) => {
                error!(error = %e, "Failed to probe resolver DNSSEC support");
                false
            }
        }
    }
}
