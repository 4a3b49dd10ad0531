//! fidi server entry point.

use clap::Parser;
use fidi_server::{logging, routes, server, AppState, ServerArgs, ServerError};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let args = ServerArgs::parse();
    logging::init(&args.log_dir, &args.log_path())?;

    let state = Arc::new(AppState::new());
    let app = routes::create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    info!(%addr, "fidi server started");
    server::serve(listener, app, state).await?;
    info!("fidi server shutting down");
    Ok(())
}
