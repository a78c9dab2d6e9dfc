//! Query transports (RFC 1035 §4.2).
//!
//! UDP first; the resolver retries over TCP (2-byte length prefix) when
//! a response comes back truncated. Both paths are bounded by the
//! remaining query lifetime.

use dane_policyd_domain::DomainError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tracing::{debug, warn};

/// Maximum UDP DNS response size we are willing to read. Larger than
/// the advertised EDNS payload so an over-eager server cannot make the
/// read fail.
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

const MAX_TCP_MESSAGE_SIZE: usize = 65535;

pub async fn query_udp(
    server_addr: SocketAddr,
    message_bytes: &[u8],
    timeout: Duration,
) -> Result<Vec<u8>, DomainError> {
    let bind_addr: SocketAddr = if server_addr.is_ipv4() {
        "0.0.0.0:0".parse().unwrap()
    } else {
        "[::]:0".parse().unwrap()
    };

    let socket = UdpSocket::bind(bind_addr)
        .await
        .map_err(|e| transport_error(server_addr, "bind UDP socket", e))?;
    socket
        .connect(server_addr)
        .await
        .map_err(|e| transport_error(server_addr, "connect UDP socket", e))?;

    tokio::time::timeout(timeout, socket.send(message_bytes))
        .await
        .map_err(|_| DomainError::QueryTimeout)?
        .map_err(|e| transport_error(server_addr, "send UDP query", e))?;

    let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
    let bytes_received = tokio::time::timeout(timeout, socket.recv(&mut recv_buf))
        .await
        .map_err(|_| DomainError::QueryTimeout)?
        .map_err(|e| transport_error(server_addr, "receive UDP response", e))?;

    recv_buf.truncate(bytes_received);

    debug!(server = %server_addr, bytes_received, "UDP response received");
    Ok(recv_buf)
}

pub async fn query_tcp(
    server_addr: SocketAddr,
    message_bytes: &[u8],
    timeout: Duration,
) -> Result<Vec<u8>, DomainError> {
    let mut stream = tokio::time::timeout(timeout, TcpStream::connect(server_addr))
        .await
        .map_err(|_| DomainError::QueryTimeout)?
        .map_err(|e| transport_error(server_addr, "connect", e))?;

    if let Err(e) = stream.set_nodelay(true) {
        warn!(server = %server_addr, error = %e, "Failed to set TCP_NODELAY");
    }

    tokio::time::timeout(timeout, send_with_length_prefix(&mut stream, message_bytes))
        .await
        .map_err(|_| DomainError::QueryTimeout)?
        .map_err(|e| transport_error(server_addr, "send query", e))?;

    let response = tokio::time::timeout(timeout, read_with_length_prefix(&mut stream))
        .await
        .map_err(|_| DomainError::QueryTimeout)??;

    debug!(server = %server_addr, response_len = response.len(), "TCP response received");
    Ok(response)
}

async fn send_with_length_prefix<S>(stream: &mut S, message_bytes: &[u8]) -> std::io::Result<()>
where
    S: AsyncWriteExt + Unpin,
{
    let length = message_bytes.len() as u16;
    stream.write_all(&length.to_be_bytes()).await?;
    stream.write_all(message_bytes).await?;
    stream.flush().await
}

async fn read_with_length_prefix<S>(stream: &mut S) -> Result<Vec<u8>, DomainError>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| DomainError::InvalidDnsResponse(format!("Failed to read length: {}", e)))?;

    let response_len = u16::from_be_bytes(len_buf) as usize;
    if response_len > MAX_TCP_MESSAGE_SIZE {
        return Err(DomainError::InvalidDnsResponse(format!(
            "Response too large: {} bytes",
            response_len
        )));
    }

    let mut response = vec![0u8; response_len];
    stream
        .read_exact(&mut response)
        .await
        .map_err(|e| DomainError::InvalidDnsResponse(format!("Failed to read body: {}", e)))?;

    Ok(response)
}

fn transport_error(server: SocketAddr, action: &str, e: std::io::Error) -> DomainError {
    DomainError::Transport {
        server: server.to_string(),
        reason: format!("Failed to {}: {}", action, e),
    }
}
