//! DNS response decoding: header flags, rcode classification, and the
//! record data the decision engine cares about (TLSA and MX).

use dane_policyd_domain::{DomainError, MxHost, TlsaRecord};
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::RData;
use tracing::debug;

/// One parsed upstream answer.
#[derive(Debug, Clone)]
pub struct DnsAnswer {
    pub id: u16,

    pub rcode: ResponseCode,

    /// Authenticated Data flag: the upstream resolver validated the
    /// response via DNSSEC.
    pub authenticated: bool,

    pub truncated: bool,

    pub tlsa_records: Vec<TlsaRecord>,

    pub mx_hosts: Vec<MxHost>,
}

impl DnsAnswer {
    pub fn is_nxdomain(&self) -> bool {
        self.rcode == ResponseCode::NXDomain
    }

    /// A server answering with one of these has nothing usable to say;
    /// the next configured nameserver should be tried instead.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self.rcode,
            ResponseCode::ServFail | ResponseCode::Refused | ResponseCode::NotImp
        )
    }
}

pub struct ResponseParser;

impl ResponseParser {
    pub fn parse(response_bytes: &[u8]) -> Result<DnsAnswer, DomainError> {
        let message = Message::from_vec(response_bytes)
            .map_err(|e| DomainError::InvalidDnsResponse(format!("Failed to parse: {}", e)))?;

        let mut tlsa_records = Vec::new();
        let mut mx_hosts = Vec::new();

        for record in message.answers() {
            match record.data() {
                RData::TLSA(tlsa) => {
                    tlsa_records.push(TlsaRecord::new(
                        u8::from(tlsa.cert_usage()),
                        u8::from(tlsa.selector()),
                        u8::from(tlsa.matching()),
                    ));
                }
                RData::MX(mx) => {
                    let exchange = mx.exchange().to_utf8();
                    mx_hosts.push(MxHost::new(
                        exchange.trim_end_matches('.'),
                        mx.preference(),
                    ));
                }
                _ => {}
            }
        }

        let answer = DnsAnswer {
            id: message.id(),
            rcode: message.response_code(),
            authenticated: message.authentic_data(),
            truncated: message.truncated(),
            tlsa_records,
            mx_hosts,
        };

        debug!(
            rcode = ?answer.rcode,
            authenticated = answer.authenticated,
            truncated = answer.truncated,
            tlsa = answer.tlsa_records.len(),
            mx = answer.mx_hosts.len(),
            "DNS response parsed"
        );

        Ok(answer)
    }
}
