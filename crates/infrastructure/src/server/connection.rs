//! Per-connection protocol loop.
//!
//! The MTA protocol is line oriented: each request line gets exactly
//! one response line, and the connection stays open for further
//! requests until the peer closes it or shutdown is requested. Reads
//! are polled in short slices so an idle connection notices the
//! shutdown token quickly instead of blocking forever. The slices use
//! `read_until`, which is cancel safe: bytes read before a slice
//! expires stay in the buffer, so a request written in several pieces
//! survives any number of poll timeouts.

use dane_policyd_application::use_cases::HandlePolicyRequestUseCase;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How long one read slice may block before re-checking the shutdown
/// token.
const READ_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Longest request line we accept before declaring the peer broken.
const MAX_LINE_LENGTH: usize = 4096;

pub async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    handler: Arc<HandlePolicyRequestUseCase>,
    shutdown: CancellationToken,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut buf = Vec::new();

    loop {
        buf.clear();

        let bytes_read = loop {
            if shutdown.is_cancelled() {
                debug!(peer = %peer_addr, "Shutdown requested, closing connection");
                return;
            }
            match tokio::time::timeout(READ_POLL_INTERVAL, reader.read_until(b'\n', &mut buf)).await
            {
                Ok(Ok(n)) => break n,
                Ok(Err(e)) => {
                    debug!(peer = %peer_addr, error = %e, "Read error, closing connection");
                    return;
                }
                // Slice elapsed without a complete line; whatever
                // arrived so far is still in `buf`.
                Err(_) => {
                    if buf.len() > MAX_LINE_LENGTH {
                        warn!(peer = %peer_addr, "Request line too long, closing connection");
                        return;
                    }
                }
            }
        };

        if bytes_read == 0 && buf.is_empty() {
            debug!(peer = %peer_addr, "Peer closed connection");
            return;
        }
        if buf.len() > MAX_LINE_LENGTH {
            warn!(peer = %peer_addr, "Request line too long, closing connection");
            return;
        }

        let line = String::from_utf8_lossy(&buf);
        let response = handler.execute(&line).await;

        if let Err(e) = write_half.write_all(response.as_line().as_bytes()).await {
            debug!(peer = %peer_addr, error = %e, "Write error, closing connection");
            return;
        }
        if let Err(e) = write_half.flush().await {
            debug!(peer = %peer_addr, error = %e, "Flush error, closing connection");
            return;
        }

        // EOF after an unterminated final line: answered above, done.
        if bytes_read == 0 {
            debug!(peer = %peer_addr, "Peer closed connection");
            return;
        }
    }
}
