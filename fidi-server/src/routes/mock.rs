//! The mock request endpoint.
//!
//! Every path other than `/healthz` lands here: the body is parsed as a
//! request document, validated, and either rejected with the collected
//! diagnostics (400, no fan-out) or handed to the executor. The response
//! is a minimal HTML envelope carrying the request counter and any
//! diagnostics.

use crate::executor;
use crate::state::AppState;
use axum::extract::{ConnectInfo, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use fidi_dsl::{parse, validate};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

// ============================================================================
// HANDLER
// ============================================================================

pub async fn handle(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    method: Method,
    uri: Uri,
    body: String,
) -> Response {
    let count = state.next_request_count();
    match peer {
        Some(ConnectInfo(addr)) => info!("Request from {}", addr),
        None => info!("Request"),
    }

    let (model, parse_errors) = parse(&body);
    let validation = validate(&model);

    let mut sections = String::new();
    if !parse_errors.is_empty() {
        sections.push_str("    <h2>Parse Syntax Errors</h2>\n\n\n");
        for err in &parse_errors {
            sections.push_str(&err.to_string());
            sections.push('\n');
        }
    }
    if !validation.is_clean() {
        sections.push_str("    <h2>Parse Errors</h2>\n\n\n");
        sections.push_str(&validation.messages);
    }

    let status = if sections.is_empty() {
        executor::execute(&model, &state).await
    } else {
        StatusCode::BAD_REQUEST
    };

    let html = envelope(count, &method, &uri, &sections);
    info!("Response sent for count={} and URI={}", count, uri);
    (status, Html(html)).into_response()
}

// ============================================================================
// RESPONSE ENVELOPE
// ============================================================================

fn envelope(count: u64, method: &Method, uri: &Uri, sections: &str) -> String {
    format!(
        "<html><head><title>fidi -- a service mock instance</title></head>\n\
         <body>\n\
         <h1>Hello world!</h1>\n\
         <p>Count: {count}</p>\n\
         <p>Method: {method}</p>\n\
         <p>URI: {uri}</p>\n\
         {sections}</body></html>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_carries_counter_and_sections() {
        let html = envelope(
            7,
            &Method::POST,
            &"/fidi".parse().unwrap(),
            "    <h2>Parse Errors</h2>\n",
        );
        assert!(html.contains("<p>Count: 7</p>"));
        assert!(html.contains("<p>Method: POST</p>"));
        assert!(html.contains("<p>URI: /fidi</p>"));
        assert!(html.contains("<h2>Parse Errors</h2>"));
        assert!(html.ends_with("</body></html>\n"));
    }
}
