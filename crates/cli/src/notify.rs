//! systemd readiness notification (`sd_notify` protocol, `Type=notify`
//! units). A no-op outside systemd: without `NOTIFY_SOCKET` in the
//! environment nothing is sent.

use std::os::unix::net::UnixDatagram;
use tracing::debug;

pub fn ready() {
    notify("READY=1");
}

pub fn stopping() {
    notify("STOPPING=1");
}

fn notify(state: &str) {
    let Ok(socket_path) = std::env::var("NOTIFY_SOCKET") else {
        return;
    };

    // A leading '@' names an abstract socket, which std's path-based
    // addressing cannot express. systemd uses a filesystem socket for
    // services, so only that case is handled.
    if socket_path.starts_with('@') {
        debug!(socket = %socket_path, "Abstract notify socket not supported, skipping");
        return;
    }

    let result = UnixDatagram::unbound()
        .and_then(|socket| socket.send_to(state.as_bytes(), &socket_path).map(|_| ()));

    match result {
        Ok(()) => debug!(state, "Notified service manager"),
        Err(e) => debug!(state, error = %e, "Failed to notify service manager"),
    }
}
