use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upstream resolver settings, frozen before the first query is issued.
///
/// Nameservers are `ip` or `ip:port` strings; an empty list means the
/// system resolver configuration is used. The EDNS payload size and the
/// DNSSEC-OK / AD / RD flags are fixed by the wire client, not
/// configurable.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub nameservers: Vec<String>,

    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,

    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            nameservers: Vec::new(),
            query_timeout_secs: default_query_timeout_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

impl ResolverConfig {
    /// Overall lifetime of one TLSA or MX resolution.
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    /// Lifetime of the startup DNSSEC capability probe.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

fn default_query_timeout_secs() -> u64 {
    10
}

fn default_probe_timeout_secs() -> u64 {
    5
}
