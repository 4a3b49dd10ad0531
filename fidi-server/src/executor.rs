//! Request executor, the concurrency core.
//!
//! Given a validated model, the executor runs the request's script in
//! strict order: response status, pre-delay, sequence-ordered fan-out,
//! request log lines, health toggle, unresponsive window, post-delay.
//!
//! Fan-out ordering guarantees:
//! - groups run in ascending sequence order, with a barrier between
//!   groups: every call of group *i* returns or fails before any call of
//!   group *i+1* is initiated;
//! - within a group, all calls (across edges and repetitions) run
//!   concurrently, bounded only by the process-wide caller pool.

use crate::caller::{self, CallSpec};
use crate::logging::REQUEST_LOG_TARGET;
use crate::state::AppState;
use axum::http::StatusCode;
use fidi_dsl::{unquote, RequestModel};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, trace, warn};

/// Execute one validated request. Returns the response status; the caller
/// writes the response body after this returns, so the status is always
/// settled before the body.
pub async fn execute(model: &RequestModel, state: &Arc<AppState>) -> StatusCode {
    let status = response_status(model);

    if let Some(ms) = model.top_attr_i64("predelay") {
        sleep(Duration::from_millis(ms.max(0) as u64)).await;
    }

    let timeout = caller::timeout_from_parts(
        model.top_attr_i64("timeout_sec"),
        model.top_attr_i64("timeout_usec"),
    );

    for (sequence, group) in model.edges_by_sequence() {
        let mut tasks = Vec::new();
        for edge in group {
            let url = match model.url_for(&edge.destination) {
                Some(url) => url,
                // Validation rejects unknown destinations before execution.
                None => {
                    error!("No connection attributes for {}", edge.destination);
                    continue;
                }
            };
            let payload = model.forward_payload(edge);
            let repeat = edge.repeat.max(1);
            for _ in 0..repeat {
                let permit = match state.caller_pool.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        error!("Caller pool is closed, dropping call to {}", url);
                        break;
                    }
                };
                let client = state.http.clone();
                let spec = CallSpec {
                    url: url.clone(),
                    payload: payload.clone(),
                    timeout,
                };
                tasks.push(tokio::spawn(async move {
                    let _permit = permit;
                    caller::call(&client, spec).await;
                }));
            }
        }

        // Sequence-point barrier.
        debug!("Waiting for {} calls in sequence {}", tasks.len(), sequence);
        for task in tasks {
            if let Err(e) = task.await {
                error!("Caller task failed: {}", e);
            }
        }
    }

    emit_request_logs(model);

    if let Some(healthy) = model.top_attr("healthy") {
        state.health.set_healthy(healthy == "true");
    }

    if let Some(duration) = unresponsive_duration(model) {
        state.health.set_unresponsive_for(duration);
    }

    if let Some(ms) = model.top_attr_i64("postdelay") {
        sleep(Duration::from_millis(ms.max(0) as u64)).await;
    }

    status
}

/// The response status the request asked for. Validation has already
/// vouched that `response` is an integer in (0, 600); the few values in
/// that range HTTP cannot express degrade to 500.
fn response_status(model: &RequestModel) -> StatusCode {
    let code = model.top_attr_i64("response").unwrap_or(200);
    match StatusCode::from_u16(code as u16) {
        Ok(status) => status,
        Err(_) => {
            warn!("Response code {} is not a representable HTTP status", code);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Emit each present `log_<level>` attribute, in fixed level order. These
/// records go to the file logger only, so they carry the request-log
/// target the console sink filters out. The eight request levels map onto
/// tracing's five; the lossy ones keep their original name in a
/// `severity` field.
fn emit_request_logs(model: &RequestModel) {
    if let Some(msg) = model.top_attr("log_trace") {
        trace!(target: REQUEST_LOG_TARGET, "{}", unquote(msg));
    }
    if let Some(msg) = model.top_attr("log_debug") {
        debug!(target: REQUEST_LOG_TARGET, "{}", unquote(msg));
    }
    if let Some(msg) = model.top_attr("log_information") {
        info!(target: REQUEST_LOG_TARGET, "{}", unquote(msg));
    }
    if let Some(msg) = model.top_attr("log_notice") {
        info!(target: REQUEST_LOG_TARGET, severity = "notice", "{}", unquote(msg));
    }
    if let Some(msg) = model.top_attr("log_warning") {
        warn!(target: REQUEST_LOG_TARGET, "{}", unquote(msg));
    }
    if let Some(msg) = model.top_attr("log_error") {
        error!(target: REQUEST_LOG_TARGET, "{}", unquote(msg));
    }
    if let Some(msg) = model.top_attr("log_critical") {
        error!(target: REQUEST_LOG_TARGET, severity = "critical", "{}", unquote(msg));
    }
    if let Some(msg) = model.top_attr("log_fatal") {
        error!(target: REQUEST_LOG_TARGET, severity = "fatal", "{}", unquote(msg));
    }
}

/// The unresponsive window the request asked for, if any.
fn unresponsive_duration(model: &RequestModel) -> Option<Duration> {
    let sec = model.top_attr_i64("unresponsive_for_sec");
    let usec = model.top_attr_i64("unresponsive_for_usec");
    if sec.is_none() && usec.is_none() {
        return None;
    }
    Some(
        Duration::from_secs(sec.unwrap_or(0).max(0) as u64)
            + Duration::from_micros(usec.unwrap_or(0).max(0) as u64),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use fidi_dsl::parse;

    fn model_for(source: &str) -> RequestModel {
        let (model, errors) = parse(source);
        assert!(errors.is_empty(), "{:?}", errors);
        model
    }

    #[test]
    fn test_response_status() {
        assert_eq!(
            response_status(&model_for("[ response = 204 ]")),
            StatusCode::NO_CONTENT
        );
        assert_eq!(
            response_status(&model_for("[ response = 42 ]")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unresponsive_duration() {
        assert_eq!(unresponsive_duration(&model_for("[ response = 200 ]")), None);
        assert_eq!(
            unresponsive_duration(&model_for(
                "[ response = 200, unresponsive_for_sec = 1, unresponsive_for_usec = 500000 ]"
            )),
            Some(Duration::from_micros(1_500_000))
        );
        assert_eq!(
            unresponsive_duration(&model_for("[ response = 200, unresponsive_for_usec = 250 ]")),
            Some(Duration::from_micros(250))
        );
    }

    #[tokio::test]
    async fn test_execute_sets_health() {
        let state = Arc::new(AppState::new());
        let model = model_for("[ response = 200, healthy = false ]");
        let status = execute(&model, &state).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!state.health.is_healthy());

        let model = model_for("[ response = 200, healthy = true ]");
        execute(&model, &state).await;
        assert!(state.health.is_healthy());
    }

    #[tokio::test]
    async fn test_execute_arms_unresponsive_window() {
        let state = Arc::new(AppState::new());
        let model = model_for("[ response = 200, unresponsive_for_sec = 60 ]");
        execute(&model, &state).await;
        assert!(!state.health.is_responsive());
    }
}
