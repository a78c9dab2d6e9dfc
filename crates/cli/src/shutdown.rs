//! Signal handling.
//!
//! SIGHUP, SIGINT, SIGTERM and SIGQUIT all mean the same thing here:
//! stop accepting connections, drain in-flight requests, exit. The
//! first signal cancels the shutdown token; later ones are ignored so
//! an impatient second Ctrl-C does not abort the drain.

use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

pub fn spawn_signal_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => return error!(error = %e, "Failed to install SIGHUP handler"),
        };
        let mut interrupt = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(e) => return error!(error = %e, "Failed to install SIGINT handler"),
        };
        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => return error!(error = %e, "Failed to install SIGTERM handler"),
        };
        let mut quit = match signal(SignalKind::quit()) {
            Ok(s) => s,
            Err(e) => return error!(error = %e, "Failed to install SIGQUIT handler"),
        };

        loop {
            let name = tokio::select! {
                _ = hangup.recv() => "SIGHUP",
                _ = interrupt.recv() => "SIGINT",
                _ = terminate.recv() => "SIGTERM",
                _ = quit.recv() => "SIGQUIT",
            };

            if shutdown.is_cancelled() {
                debug!(signal = name, "Already shutting down, ignoring signal");
                continue;
            }

            info!(signal = name, "Received shutdown signal");
            shutdown.cancel();
        }
    });
}
