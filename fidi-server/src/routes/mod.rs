//! HTTP routing.

pub mod health;
pub mod mock;

use crate::state::AppState;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tracing::debug;

/// Build the application router: `/healthz` plus the catch-all mock
/// endpoint, behind the unresponsive gate. Unknown paths are not an
/// error, they are mock traffic.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .fallback(mock::handle)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            unresponsive_gate,
        ))
        .with_state(state)
}

/// Drop all traffic on the floor while the unresponsive window is open.
///
/// New connections never get this far (the accept loop closes them), but a
/// request riding an already-open keep-alive connection does, and it must
/// be stalled before any extractor reads the body off the socket. The
/// pending future resolves never; hyper drops it when the client gives up
/// and closes the connection.
async fn unresponsive_gate(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.health.is_responsive() {
        debug!("Stalling in-flight connection during unresponsive window");
        std::future::pending::<()>().await;
        unreachable!();
    }
    next.run(request).await
}
