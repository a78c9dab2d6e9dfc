use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Malformed request line: {0:?}")]
    MalformedRequest(String),

    #[error("Query timeout")]
    QueryTimeout,

    #[error("Domain not found (NXDOMAIN)")]
    NxDomain,

    #[error("No usable nameservers")]
    NoNameservers,

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Transport error talking to {server}: {reason}")]
    Transport { server: String, reason: String },

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
