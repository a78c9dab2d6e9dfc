//! DANE Policy Daemon Domain Layer
pub mod config;
pub mod errors;
pub mod mx;
pub mod request;
pub mod response;
pub mod tlsa;

pub use config::{CliOverrides, Config, ConfigError};
pub use errors::DomainError;
pub use mx::MxHost;
pub use request::PolicyRequest;
pub use response::PolicyResponse;
pub use tlsa::{IndeterminateReason, TlsaLookup, TlsaRecord, TlsaVerdict};
