//! Process-wide server state.
//!
//! The only state shared across requests: the health flag and the
//! unresponsive deadline behind a single mutex, the request counter, the
//! bounded caller pool, and the shared HTTP client. Everything else lives
//! per request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Upper bound on concurrent outbound callers across the whole process.
/// Excess callers queue on the semaphore and are admitted in FIFO order.
pub const MAX_CONCURRENT_CALLERS: usize = 1024;

#[derive(Debug)]
struct HealthInner {
    healthy: bool,
    unresponsive_until: Option<Instant>,
}

/// The node's health flag and unresponsive window, guarded together so a
/// reader always observes the most recent write.
#[derive(Debug)]
pub struct NodeHealth {
    inner: Mutex<HealthInner>,
}

impl NodeHealth {
    fn new() -> Self {
        Self {
            inner: Mutex::new(HealthInner {
                healthy: true,
                unresponsive_until: None,
            }),
        }
    }

    /// Is the node currently reporting healthy?
    pub fn is_healthy(&self) -> bool {
        self.lock().healthy
    }

    /// Set the health flag.
    pub fn set_healthy(&self, healthy: bool) {
        self.lock().healthy = healthy;
    }

    /// Is the node outside any unresponsive window? While this returns
    /// false the server drops inbound connections on the floor.
    pub fn is_responsive(&self) -> bool {
        match self.lock().unresponsive_until {
            Some(until) => Instant::now() >= until,
            None => true,
        }
    }

    /// Arm the unresponsive window for the given duration from now.
    pub fn set_unresponsive_for(&self, duration: Duration) {
        self.lock().unresponsive_until = Some(Instant::now() + duration);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HealthInner> {
        // A poisoned health mutex means a panic while holding a plain
        // bool/Instant pair; the data is still coherent.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Shared state handed to every request handler.
#[derive(Debug)]
pub struct AppState {
    pub health: NodeHealth,
    requests: AtomicU64,
    pub caller_pool: Arc<Semaphore>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            health: NodeHealth::new(),
            requests: AtomicU64::new(0),
            caller_pool: Arc::new(Semaphore::new(MAX_CONCURRENT_CALLERS)),
            http: reqwest::Client::new(),
        }
    }

    /// Next value of the request counter, starting at 1.
    pub fn next_request_count(&self) -> u64 {
        self.requests.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_defaults_and_toggle() {
        let health = NodeHealth::new();
        assert!(health.is_healthy());
        health.set_healthy(false);
        assert!(!health.is_healthy());
        health.set_healthy(true);
        assert!(health.is_healthy());
    }

    #[test]
    fn test_unresponsive_window_expires() {
        let health = NodeHealth::new();
        assert!(health.is_responsive());

        health.set_unresponsive_for(Duration::from_secs(60));
        assert!(!health.is_responsive());

        health.set_unresponsive_for(Duration::ZERO);
        assert!(health.is_responsive());
    }

    #[test]
    fn test_request_counter_increments() {
        let state = AppState::new();
        assert_eq!(state.next_request_count(), 1);
        assert_eq!(state.next_request_count(), 2);
    }
}
