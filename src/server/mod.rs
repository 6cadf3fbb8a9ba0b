// Server module entry point
// Binding, the sequential accept loop, connection serving and signal handling

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the file is mounted as server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{AppState, Config};
use crate::error::ServeError;
use crate::logger;

pub use listener::bind_listener;
pub use server_loop::run_until;

/// A bound, not yet running, server instance
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Server {
    /// Resolve the root directory and bind the listener.
    ///
    /// Binding is attempted once; a port already in use is a `ServeError::Bind`.
    pub fn bind(config: &Config) -> Result<Self, ServeError> {
        let state = Arc::new(AppState::new(config)?);
        let addr = config.socket_addr()?;
        let listener = bind_listener(addr).map_err(|source| ServeError::Bind { addr, source })?;
        Ok(Self { listener, state })
    }

    /// Address actually bound (differs from the configured one for port 0)
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Serve until `shutdown` completes, then close the listener
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        run_until(self.listener, self.state, shutdown).await;
    }
}

/// Bind, print the banner and serve until SIGINT (or SIGTERM on Unix)
pub async fn start(config: &Config) -> Result<(), ServeError> {
    let server = Server::bind(config)?;
    let addr = match server.local_addr() {
        Ok(addr) => addr,
        Err(_) => config.socket_addr()?,
    };

    logger::log_server_start(&addr, &server.state().root);
    server.run(signal::shutdown_signal()).await;
    Ok(())
}
