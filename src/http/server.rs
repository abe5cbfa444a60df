//! HTTP server.
//!
//! Accepts connections and serves each one on its own task with hyper's
//! HTTP/1.1 connection driver.

use crate::http::middleware::handle;
use crate::state::AppState;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

/// Errors that can occur while starting the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read local address: {0}")]
    LocalAddr(#[source] std::io::Error),
}

/// HTTP server serving the demo routes and the metrics endpoint.
pub struct HttpServer {
    /// TCP listener.
    listener: TcpListener,
    /// Address actually bound.
    local_addr: SocketAddr,
    /// Shared state.
    state: AppState,
}

impl HttpServer {
    /// Bind the listener. Port 0 picks an ephemeral port; see `local_addr`.
    pub async fn bind(address: SocketAddr, state: AppState) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(address)
            .await
            .map_err(|source| ServerError::Bind { address, source })?;
        let local_addr = listener.local_addr().map_err(ServerError::LocalAddr)?;

        info!(
            listen = %local_addr,
            metrics_path = %state.router().metrics_path(),
            "http server bound"
        );

        Ok(Self {
            listener,
            local_addr,
            state,
        })
    }

    /// Address the server is listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Run the accept loop until shutdown.
    ///
    /// Connections already accepted keep running on their own tasks.
    #[instrument(skip_all, fields(listen = %self.local_addr))]
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!("http server starting");

        loop {
            tokio::select! {
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, addr)) => {
                            self.handle_connection(stream, addr);
                        }
                        Err(e) => {
                            error!(error = %e, "failed to accept connection");
                        }
                    }
                }

                _ = shutdown.recv() => {
                    info!("http server shutting down");
                    break;
                }
            }
        }
    }

    /// Serve one connection on a spawned task.
    fn handle_connection(&self, stream: TcpStream, client_addr: SocketAddr) {
        if let Err(e) = stream.set_nodelay(true) {
            warn!(error = %e, "failed to set TCP_NODELAY on client connection");
        }

        let state = self.state.clone();

        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let service = service_fn(move |req: Request<Incoming>| handle(req, state.clone()));

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!(client = %client_addr, error = %e, "connection error");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let state = AppState::new(Config::default());
        let server = HttpServer::bind("127.0.0.1:0".parse().unwrap(), state)
            .await
            .unwrap();
        assert_ne!(server.local_addr().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_conflict() {
        let state = AppState::new(Config::default());
        let first = HttpServer::bind("127.0.0.1:0".parse().unwrap(), state.clone())
            .await
            .unwrap();

        let result = HttpServer::bind(first.local_addr(), state).await;
        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let state = AppState::new(Config::default());
        let server = HttpServer::bind("127.0.0.1:0".parse().unwrap(), state.clone())
            .await
            .unwrap();

        let handle = tokio::spawn(server.run(state.shutdown().subscribe()));
        state.trigger_shutdown();
        handle.await.unwrap();
    }
}
