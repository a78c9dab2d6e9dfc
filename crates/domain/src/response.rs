use std::fmt;

/// The four fixed response codes of the policy protocol.
///
/// Every request is answered with exactly one of these, rendered as a
/// single newline-terminated ASCII line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyResponse {
    /// At least one MX host carries a DNSSEC-validated TLSA record.
    DaneOnly,
    /// No MX host yields a qualifying record.
    NoDaneRecord,
    /// First token is not a recognized command.
    UnknownCommand,
    /// Line does not split into exactly two tokens.
    MalformedData,
}

impl PolicyResponse {
    /// Wire rendering, including the terminating newline.
    pub fn as_line(&self) -> &'static str {
        match self {
            Self::DaneOnly => "200 dane-only\n",
            Self::NoDaneRecord => "500 no dane record found\n",
            Self::UnknownCommand => "500 unknown command\n",
            Self::MalformedData => "500 malformed data\n",
        }
    }
}

impl fmt::Display for PolicyResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_line().trim_end())
    }
}
