use crate::errors::DomainError;

/// One parsed wire request: `<command> <domain>`.
///
/// A line is well formed iff it splits into exactly two
/// whitespace-separated tokens. Anything else is malformed data,
/// including trailing garbage after the domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRequest {
    pub command: String,
    pub domain: String,
}

impl PolicyRequest {
    pub const GET: &'static str = "get";

    pub fn parse(line: &str) -> Result<Self, DomainError> {
        let mut tokens = line.split_whitespace();
        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(command), Some(domain), None) => Ok(Self {
                command: command.to_string(),
                domain: domain.to_string(),
            }),
            _ => Err(DomainError::MalformedRequest(line.to_string())),
        }
    }

    pub fn is_get(&self) -> bool {
        self.command == Self::GET
    }
}
