// Connection handling module
// Serves a single accepted TCP connection with hyper's HTTP/1 stack

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::sync::Arc;
use std::time::Duration;

use crate::config;
use crate::handler;
use crate::logger;

/// Handle a single connection in a spawned task.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Configures HTTP/1.1 connection settings (keep-alive, idle timeout)
/// 3. Serves the connection with the request handler
///
/// The idle timeout only runs while hyper waits for the next request head,
/// so a client may take as long as it needs to download a response.
/// Malformed requests never reach the handler; hyper answers them itself.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address, recorded in the access log
/// * `state` - Shared application state
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: &Arc<config::AppState>,
) {
    let state = Arc::clone(state);

    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let idle_timeout = Duration::from_secs(state.config.performance.idle_timeout);

        let mut builder = http1::Builder::new();
        builder
            .keep_alive(state.config.performance.keep_alive)
            .timer(TokioTimer::new())
            .header_read_timeout(idle_timeout);

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&state), peer_addr)),
        );

        if let Err(err) = conn.await {
            if err.is_timeout() {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} idle for {} seconds, closed",
                    idle_timeout.as_secs()
                ));
            } else {
                logger::log_connection_error(&err);
            }
        }
    });
}
