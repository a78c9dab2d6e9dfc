//! TCP policy server: accepts MTA connections and spawns one task per
//! connection.

use crate::server::connection::handle_connection;
use dane_policyd_application::use_cases::HandlePolicyRequestUseCase;
use dane_policyd_domain::DomainError;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

pub struct PolicyServer {
    listener: TcpListener,
    handler: Arc<HandlePolicyRequestUseCase>,
    shutdown: CancellationToken,
}

impl PolicyServer {
    /// Bind the listening socket. Fails fast so a bad address or an
    /// already-bound port is reported before the daemon announces
    /// readiness.
    pub fn bind(
        bind_addr: SocketAddr,
        handler: Arc<HandlePolicyRequestUseCase>,
        shutdown: CancellationToken,
    ) -> Result<Self, DomainError> {
        let listener = create_tcp_listener(bind_addr)
            .map_err(|e| DomainError::IoError(format!("Failed to bind {}: {}", bind_addr, e)))?;

        Ok(Self {
            listener,
            handler,
            shutdown,
        })
    }

    /// The bound address, useful when port 0 was requested.
    pub fn local_addr(&self) -> Result<SocketAddr, DomainError> {
        self.listener
            .local_addr()
            .map_err(|e| DomainError::IoError(format!("Failed to read local address: {}", e)))
    }

    /// Accept loop. Runs until the shutdown token fires, then waits for
    /// every in-flight connection task to finish so no response is cut
    /// off mid-write.
    pub async fn serve(self) -> Result<(), DomainError> {
        let local_addr = self.local_addr()?;
        info!(bind_address = %local_addr, "Policy server listening");

        let mut connections: JoinSet<()> = JoinSet::new();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer_addr)) => {
                            debug!(peer = %peer_addr, "Connection accepted");
                            let handler = self.handler.clone();
                            let shutdown = self.shutdown.clone();
                            connections.spawn(async move {
                                handle_connection(stream, peer_addr, handler, shutdown).await;
                            });
                        }
                        Err(e) => {
                            // Transient accept errors (EMFILE and
                            // friends) must not kill the daemon.
                            error!(error = %e, "Failed to accept connection");
                        }
                    }
                }
                // Reap finished handlers as they complete, so the set
                // stays bounded by the number of live connections.
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown requested, no longer accepting connections");
                    break;
                }
            }
        }

        drop(self.listener);

        let in_flight = connections.len();
        if in_flight > 0 {
            info!(in_flight, "Waiting for in-flight connections to finish");
        }
        while connections.join_next().await.is_some() {}

        Ok(())
    }
}

fn create_tcp_listener(socket_addr: SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;
    socket.set_nonblocking(true)?;
    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
