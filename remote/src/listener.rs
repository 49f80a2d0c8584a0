//! The server's accept loop: two 30 s windows, up to 10 connections,
//! abort unless at least 5 clients made it in.

use std::net::TcpListener;
use std::time::{Duration, Instant};

use crate::proxy::PlayerProxy;

const WINDOW: Duration = Duration::from_secs(30);
const MAX_CLIENTS: usize = 10;
const MIN_CLIENTS: usize = 5;
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Blocks for up to two 30 s windows accepting connections, silently
/// dropping any whose name proxy rejects. Returns the accepted players, or
/// an empty vector if fewer than 5 ever connected.
pub fn accept_players(listener: &TcpListener) -> Vec<PlayerProxy> {
    listener.set_nonblocking(true).expect("listener must support non-blocking accept");

    let mut clients = Vec::new();
    accept_window(listener, &mut clients);
    log::info!("{} client(s) connected in the first window", clients.len());

    if clients.len() < MIN_CLIENTS {
        log::info!("fewer than {} clients, extending once", MIN_CLIENTS);
        accept_window(listener, &mut clients);
    }

    if clients.len() < MIN_CLIENTS {
        log::warn!("only {} client(s) connected, aborting", clients.len());
        Vec::new()
    } else {
        clients
    }
}

fn accept_window(listener: &TcpListener, clients: &mut Vec<PlayerProxy>) {
    let deadline = Instant::now() + WINDOW;
    while clients.len() < MAX_CLIENTS && Instant::now() < deadline {
        match listener.accept() {
            Ok((stream, addr)) => {
                if let Err(e) = stream.set_nonblocking(false) {
                    log::warn!("failed to configure socket for {}: {}", addr, e);
                    continue;
                }
                match PlayerProxy::accept(stream) {
                    Ok(proxy) => clients.push(proxy),
                    Err(reason) => log::info!("dropped a connection from {}: {}", addr, reason),
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                log::warn!("accept failed: {}", e);
                break;
            }
        }
    }
}
