//! TLSA lookup outcomes and the DANE verdict policy.
//!
//! The five-way lookup taxonomy is a closed enum: the two
//! `Indeterminate` causes resolve to opposite boolean outcomes, so
//! every caller has to match each variant explicitly.

/// One TLSA record, reduced to the three parameters the DANE policy
/// inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlsaRecord {
    pub usage: u8,
    pub selector: u8,
    pub matching_type: u8,
}

impl TlsaRecord {
    pub fn new(usage: u8, selector: u8, matching_type: u8) -> Self {
        Self {
            usage,
            selector,
            matching_type,
        }
    }

    /// Whether this record is a usable DANE assertion for SMTP:
    /// usage DANE-TA(2)/DANE-EE(3), selector Cert(0)/SPKI(1),
    /// matching type Full(0)/SHA-256(1)/SHA-512(2).
    pub fn is_dane_usable(&self) -> bool {
        matches!(self.usage, 2 | 3)
            && matches!(self.selector, 0 | 1)
            && matches!(self.matching_type, 0 | 1 | 2)
    }
}

/// Raw outcome of resolving `_25._tcp.<host> IN TLSA`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsaLookup {
    /// A response was received. `authenticated` carries the AD flag.
    Records {
        authenticated: bool,
        records: Vec<TlsaRecord>,
    },
    /// The name does not exist (or could not even be constructed).
    NxDomain,
    /// Every configured nameserver refused to produce a usable answer.
    /// With a validating resolver upstream this is what a broken DNSSEC
    /// chain looks like.
    NoNameservers,
    /// The query lifetime expired.
    Timeout,
    /// Anything else.
    Failed(String),
}

/// Why a probe could not produce a definite answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndeterminateReason {
    /// DNSSEC validation failed upstream. Security-sensitive.
    ValidationFailure,
    /// The query timed out. Availability-sensitive.
    Timeout,
}

/// Tri-state verdict for one hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsaVerdict {
    /// A DNSSEC-authenticated, DANE-usable record exists.
    Found,
    /// Confirmed absent. Expected and benign.
    NotFound,
    /// Ambiguous; resolved by `requires_dane`, never treated as absent
    /// implicitly.
    Indeterminate(IndeterminateReason),
}

impl TlsaVerdict {
    /// Resolve the verdict into the delivery policy.
    ///
    /// A validation failure fails closed: delivery is deferred rather
    /// than risk a downgraded session. A timeout fails open: a
    /// transient resolver outage must not block mail indefinitely.
    pub fn requires_dane(&self) -> bool {
        match self {
            Self::Found => true,
            Self::NotFound => false,
            Self::Indeterminate(IndeterminateReason::ValidationFailure) => true,
            Self::Indeterminate(IndeterminateReason::Timeout) => false,
        }
    }
}
