//! Health endpoint.
//!
//! `GET /healthz` reports 200 only while the node is healthy and outside
//! any unresponsive window. No body, no request parsing.

use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::trace;

pub async fn healthz(State(state): State<Arc<AppState>>) -> StatusCode {
    trace!("Healthz");
    if state.health.is_healthy() && state.health.is_responsive() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
