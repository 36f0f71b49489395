//! HTTP server for the admin API and replay traffic.

use crate::admin_api::router::route_request;
use crate::application::ApplicationManager;
use crate::config::ReplayConfig;
use anyhow::Context;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// State shared by every request handler
pub struct ServerState {
    pub manager: Arc<ApplicationManager>,
    pub replay: ReplayConfig,
}

/// Stubline HTTP server.
///
/// Constructed once at startup around an `ApplicationManager`; serves until the
/// shutdown future resolves.
pub struct StublineServer {
    state: Arc<ServerState>,
}

impl StublineServer {
    pub fn new(manager: Arc<ApplicationManager>, replay: ReplayConfig) -> Self {
        Self {
            state: Arc::new(ServerState { manager, replay }),
        }
    }

    /// Bind to `addr` and serve until `shutdown` resolves
    pub async fn run(
        self,
        addr: &str,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), anyhow::Error> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        self.serve(listener, shutdown).await
    }

    /// Serve connections from an already bound listener until `shutdown` resolves
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), anyhow::Error> {
        let local_addr: SocketAddr = listener.local_addr()?;
        info!("Stubline listening on http://{}", local_addr);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                result = listener.accept() => {
                    let (stream, remote) = match result {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            error!("Accept error on {}: {}", local_addr, e);
                            continue;
                        }
                    };
                    let io = TokioIo::new(stream);
                    let state = Arc::clone(&self.state);

                    tokio::spawn(async move {
                        let service = service_fn(move |req| {
                            let state = Arc::clone(&state);
                            async move { route_request(req, state).await }
                        });

                        if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                            debug!("Connection error from {}: {}", remote, e);
                        }
                    });
                }
                _ = &mut shutdown => {
                    info!("Stubline on {} shutting down", local_addr);
                    break;
                }
            }
        }

        Ok(())
    }
}
