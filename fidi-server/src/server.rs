//! Accept loop and connection serving.
//!
//! The listener is driven by hand instead of `axum::serve` because the
//! unresponsive window has to drop a connection before any bytes are read
//! from it; accepted streams are handed to hyper only when the node is
//! responsive.

use crate::error::ServerError;
use crate::state::AppState;
use axum::extract::connect_info::ConnectInfo;
use axum::Router;
use hyper::body::Incoming;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnectionBuilder;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceExt;
use tracing::{debug, info};

/// Serve the router on the listener until ctrl-c.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    state: Arc<AppState>,
) -> Result<(), ServerError> {
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, remote_addr) = accepted?;
                // Inside the unresponsive window the node plays dead: the
                // connection is closed before a single byte is read.
                if !state.health.is_responsive() {
                    debug!("Dropping connection from {}", remote_addr);
                    continue;
                }
                let tower_service = app.clone();
                tokio::spawn(async move {
                    let socket = TokioIo::new(stream);
                    let hyper_service =
                        hyper::service::service_fn(move |mut request: Request<Incoming>| {
                            request.extensions_mut().insert(ConnectInfo(remote_addr));
                            tower_service.clone().oneshot(request)
                        });
                    if let Err(e) = ConnectionBuilder::new(TokioExecutor::new())
                        .serve_connection(socket, hyper_service)
                        .await
                    {
                        debug!("Connection from {} ended: {}", remote_addr, e);
                    }
                });
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                return Ok(());
            }
        }
    }
}
