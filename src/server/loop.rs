// Server loop module
// Sequential accept loop: one connection is served to completion before the next

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::serve_connection;
use crate::config::AppState;
use crate::logger;

/// Accept and serve connections until `shutdown` completes.
///
/// The shutdown future is raced against both `accept` and the connection in
/// flight. The listener is dropped, and so closed, before this returns.
pub async fn run_until<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        tokio::select! {
                            () = serve_connection(stream, peer_addr, &state) => {}
                            () = &mut shutdown => break,
                        }
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = &mut shutdown => break,
        }
    }

    logger::log_shutdown();
    drop(listener);
}
