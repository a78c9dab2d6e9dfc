use std::cmp::Ordering;

/// One mail exchanger of a domain.
///
/// Ordering is ascending by preference (lower preference is tried first
/// by a sending MTA), with the hostname as a tie breaker so sorting is
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxHost {
    pub hostname: String,
    pub preference: u16,
}

impl MxHost {
    pub fn new(hostname: impl Into<String>, preference: u16) -> Self {
        Self {
            hostname: hostname.into(),
            preference,
        }
    }
}

impl Ord for MxHost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.preference
            .cmp(&other.preference)
            .then_with(|| self.hostname.cmp(&other.hostname))
    }
}

impl PartialOrd for MxHost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
