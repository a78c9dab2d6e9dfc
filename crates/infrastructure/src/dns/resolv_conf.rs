//! Nameserver address parsing and system resolver discovery.
//!
//! Configured nameservers are bare IPs or `ip:port` pairs; a missing
//! port means 53. When nothing is configured the daemon falls back to
//! the system's `/etc/resolv.conf`, and failing that to the local stub
//! at 127.0.0.53.

use dane_policyd_domain::DomainError;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use tracing::{debug, warn};

const DNS_PORT: u16 = 53;

const RESOLV_CONF_PATH: &str = "/etc/resolv.conf";

/// systemd-resolved's stub listener, the usual local validating
/// resolver on modern distributions.
const FALLBACK_NAMESERVER: &str = "127.0.0.53:53";

/// Parse one configured nameserver entry: `1.2.3.4`, `1.2.3.4:5353`,
/// `2001:db8::1`, or `[2001:db8::1]:5353`.
pub fn parse_nameserver(entry: &str) -> Result<SocketAddr, DomainError> {
    let entry = entry.trim();
    if let Ok(ip) = entry.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DNS_PORT));
    }
    entry.parse::<SocketAddr>().map_err(|e| {
        DomainError::ConfigError(format!("Invalid nameserver '{}': {}", entry, e))
    })
}

/// Parse a list of configured entries, failing on the first bad one.
pub fn parse_nameservers(entries: &[String]) -> Result<Vec<SocketAddr>, DomainError> {
    entries.iter().map(|entry| parse_nameserver(entry)).collect()
}

/// Nameservers from `/etc/resolv.conf`, or the local stub resolver if
/// the file is missing or lists none.
pub fn system_nameservers() -> Vec<SocketAddr> {
    let mut servers = read_resolv_conf(Path::new(RESOLV_CONF_PATH));
    if servers.is_empty() {
        warn!(
            fallback = FALLBACK_NAMESERVER,
            "No nameservers found in resolv.conf, using local stub resolver"
        );
        if let Ok(addr) = FALLBACK_NAMESERVER.parse::<SocketAddr>() {
            servers.push(addr);
        }
    }
    servers
}

fn read_resolv_conf(path: &Path) -> Vec<SocketAddr> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Could not read resolv.conf");
            return Vec::new();
        }
    };
    parse_resolv_conf(&contents)
}

fn parse_resolv_conf(contents: &str) -> Vec<SocketAddr> {
    contents
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = line.strip_prefix("nameserver")?;
            let address = rest.split_whitespace().next()?;
            match address.parse::<IpAddr>() {
                Ok(ip) => Some(SocketAddr::new(ip, DNS_PORT)),
                Err(_) => {
                    debug!(address, "Skipping unparseable nameserver entry");
                    None
                }
            }
        })
        .collect()
}
