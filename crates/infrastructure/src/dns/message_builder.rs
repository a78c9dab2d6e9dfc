//! DNS query construction in wire format using `hickory-proto`.
//!
//! Every outgoing query carries the same fixed resolver profile: RD and
//! AD header flags plus an EDNS(0) record with a 1232-byte payload and
//! the DNSSEC-OK bit. The flags are baked in here so no query can ever
//! be issued without them.

use dane_policyd_domain::DomainError;
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;

/// EDNS(0) advertised payload size. 1232 bytes avoids IP fragmentation
/// on virtually all paths (DNS flag day 2020 value).
pub const EDNS_PAYLOAD_SIZE: u16 = 1232;

/// Builds DNS query messages in wire format
pub struct MessageBuilder;

impl MessageBuilder {
    /// Build a query for `name`/`record_type` and serialize it.
    /// Returns the message ID for response matching along with the
    /// wire bytes.
    pub fn build_query(name: &Name, record_type: RecordType) -> Result<(u16, Vec<u8>), DomainError> {
        let mut query = Query::new();
        query.set_name(name.clone());
        query.set_query_type(record_type);
        query.set_query_class(DNSClass::IN);

        let id = fastrand::u16(..);

        let mut message = Message::new();
        message.set_id(id);
        message.set_message_type(MessageType::Query);
        message.set_op_code(OpCode::Query);
        message.set_recursion_desired(true);
        message.set_authentic_data(true);
        message.add_query(query);

        let edns = message.extensions_mut().get_or_insert_with(Edns::new);
        edns.set_max_payload(EDNS_PAYLOAD_SIZE);
        edns.set_dnssec_ok(true);

        let bytes = Self::serialize_message(&message)?;
        Ok((id, bytes))
    }

    /// Owner name of the SMTP TLSA record for `hostname`:
    /// `_25._tcp.<hostname>`. Fails on names that cannot be encoded
    /// (empty labels and the like).
    pub fn tlsa_name(hostname: &str) -> Result<Name, DomainError> {
        let owner = format!("_25._tcp.{}", hostname.trim_end_matches('.'));
        Name::from_utf8(&owner)
            .map_err(|e| DomainError::InvalidDomainName(format!("{}: {}", owner, e)))
    }

    /// Parse a bare domain into a query name.
    pub fn domain_name(domain: &str) -> Result<Name, DomainError> {
        Name::from_str(domain)
            .map_err(|e| DomainError::InvalidDomainName(format!("{}: {}", domain, e)))
    }

    /// Serialize a Message to wire format bytes
    fn serialize_message(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message
            .emit(&mut encoder)
            .map_err(|e| DomainError::InvalidDnsResponse(format!("Failed to serialize: {}", e)))?;

        Ok(buf)
    }
}
