//! Downstream HTTP caller.
//!
//! One caller makes one HTTP POST. Failures of any kind (DNS, connect,
//! timeout, protocol) are logged and swallowed: a downstream failure is a
//! modeled property of the mock, never an error of this node.

use std::time::Duration;
use tracing::{error, info};

/// Everything one downstream call needs, owned by the caller task.
#[derive(Debug, Clone)]
pub struct CallSpec {
    /// Target URL.
    pub url: String,
    /// Complete request body forwarded to the peer.
    pub payload: String,
    /// Connect and receive timeout; `None` uses the client defaults.
    pub timeout: Option<Duration>,
}

/// Perform one downstream POST with the form-encoded payload.
pub async fn call(default_client: &reqwest::Client, spec: CallSpec) {
    info!("Making call to {}\n\t{}", spec.url, spec.payload);

    // A per-call timeout needs its own client so the connect phase is
    // covered too; calls without one share the default client.
    let client = match spec.timeout {
        Some(timeout) => {
            match reqwest::Client::builder()
                .connect_timeout(timeout)
                .timeout(timeout)
                .build()
            {
                Ok(client) => client,
                Err(e) => {
                    error!("Failed to build client for {}: {}", spec.url, e);
                    return;
                }
            }
        }
        None => default_client.clone(),
    };

    let result = client
        .post(&spec.url)
        .header(
            reqwest::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(spec.payload)
        .send()
        .await;

    match result {
        Ok(response) => {
            let reason = response
                .status()
                .canonical_reason()
                .unwrap_or("Unknown Status");
            info!("{}", reason);
            // Drain the body so the connection can be reused.
            let _ = response.text().await;
        }
        Err(e) => {
            error!("Call to {} failed: {}", spec.url, e);
        }
    }
}

/// Combine whole seconds and fractional microseconds into a timeout.
/// Returns `None` when both are zero or absent, which means "use the
/// platform default".
pub fn timeout_from_parts(sec: Option<i64>, usec: Option<i64>) -> Option<Duration> {
    let sec = sec.unwrap_or(0).max(0) as u64;
    let usec = usec.unwrap_or(0).max(0) as u64;
    if sec == 0 && usec == 0 {
        None
    } else {
        Some(Duration::from_secs(sec) + Duration::from_micros(usec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_absent_when_zero() {
        assert_eq!(timeout_from_parts(None, None), None);
        assert_eq!(timeout_from_parts(Some(0), Some(0)), None);
    }

    #[test]
    fn test_timeout_combines_parts() {
        assert_eq!(
            timeout_from_parts(Some(2), Some(500_000)),
            Some(Duration::from_millis(2_500))
        );
        assert_eq!(timeout_from_parts(None, Some(250)), Some(Duration::from_micros(250)));
    }

    #[test]
    fn test_timeout_negative_parts_ignored() {
        assert_eq!(timeout_from_parts(Some(-5), None), None);
        assert_eq!(timeout_from_parts(Some(-5), Some(100)), Some(Duration::from_micros(100)));
    }
}
