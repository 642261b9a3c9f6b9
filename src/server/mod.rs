// Server module entry point
// Binds the listener and runs the accept loop until Ctrl-C

pub mod connection;
pub mod listener;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

pub use listener::create_listener;

/// Bind the configured address and serve until Ctrl-C
pub async fn run(state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let addr = state.config.get_socket_addr()?;
    let listener = create_listener(addr)?;
    logger::log_server_start(&listener.local_addr()?, &state.config);
    serve(listener, state).await;
    Ok(())
}

/// Accept loop over an already bound listener
pub async fn serve(listener: TcpListener, state: Arc<AppState>) {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer_addr)) => {
                    connection::accept_connection(stream, peer_addr, &state, &active_connections);
                }
                Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
            },
            _ = tokio::signal::ctrl_c() => {
                logger::log_server_stop();
                return;
            }
        }
    }
}
