#![allow(dead_code)]

use async_trait::async_trait;
use dane_policyd_application::ports::DnsProber;
use dane_policyd_domain::{DomainError, MxHost, TlsaLookup};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// In-memory `DnsProber` with scripted answers and call recording.
pub struct MockDnsProber {
    mx_responses: Mutex<HashMap<String, Result<Vec<MxHost>, DomainError>>>,
    tlsa_responses: Mutex<HashMap<String, TlsaLookup>>,
    tlsa_calls: Mutex<Vec<String>>,
    dnssec_response: Mutex<Result<bool, DomainError>>,
}

impl MockDnsProber {
    pub fn new() -> Self {
        Self {
            mx_responses: Mutex::new(HashMap::new()),
            tlsa_responses: Mutex::new(HashMap::new()),
            tlsa_calls: Mutex::new(Vec::new()),
            dnssec_response: Mutex::new(Ok(true)),
        }
    }

    pub fn set_mx(&self, domain: &str, records: Vec<MxHost>) {
        self.mx_responses
            .lock()
            .unwrap()
            .insert(domain.to_string(), Ok(records));
    }

    pub fn set_mx_error(&self, domain: &str, error: DomainError) {
        self.mx_responses
            .lock()
            .unwrap()
            .insert(domain.to_string(), Err(error));
    }

    pub fn set_tlsa(&self, hostname: &str, lookup: TlsaLookup) {
        self.tlsa_responses
            .lock()
            .unwrap()
            .insert(hostname.to_string(), lookup);
    }

    pub fn set_dnssec(&self, response: Result<bool, DomainError>) {
        *self.dnssec_response.lock().unwrap() = response;
    }

    /// Hostnames probed for TLSA, in call order.
    pub fn tlsa_calls(&self) -> Vec<String> {
        self.tlsa_calls.lock().unwrap().clone()
    }
}

impl Default for MockDnsProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DnsProber for MockDnsProber {
    async fn lookup_mx(
        &self,
        domain: &str,
        _timeout: Duration,
    ) -> Result<Vec<MxHost>, DomainError> {
        self.mx_responses
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn lookup_tlsa(&self, hostname: &str, _timeout: Duration) -> TlsaLookup {
        self.tlsa_calls.lock().unwrap().push(hostname.to_string());
        self.tlsa_responses
            .lock()
            .unwrap()
            .get(hostname)
            .cloned()
            .unwrap_or(TlsaLookup::NxDomain)
    }

    async fn probe_dnssec(&self, _timeout: Duration) -> Result<bool, DomainError> {
        self.dnssec_response.lock().unwrap().clone()
    }
}

pub fn authenticated_dane_ee() -> TlsaLookup {
    TlsaLookup::Records {
        authenticated: true,
        records: vec![dane_policyd_domain::TlsaRecord::new(3, 1, 1)],
    }
}
