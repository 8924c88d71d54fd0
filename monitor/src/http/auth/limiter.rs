//! Failed login bookkeeping.

use core::{net::IpAddr, time::Duration};
use std::collections::HashMap;

use tokio::{sync::Mutex, time::Instant};

/// Failed attempts allowed per client address within [`WINDOW`].
pub(crate) const MAX_FAILED_ATTEMPTS: usize = 5;

pub(crate) const WINDOW: Duration = Duration::from_secs(15 * 60);

/// Sliding-window limiter for failed logins, keyed by client IP.
#[derive(Default)]
pub(crate) struct LoginLimiter {
    failures: Mutex<HashMap<IpAddr, Vec<Instant>>>,
}

impl LoginLimiter {
    /// Returns how long the client has to wait when it has used up its attempts.
    pub(crate) async fn retry_after(&self, ip: IpAddr) -> Option<Duration> {
        let now = Instant::now();
        let mut failures = self.failures.lock().await;
        let attempts = failures.get_mut(&ip)?;
        attempts.retain(|at| now.duration_since(*at) < WINDOW);
        if attempts.is_empty() {
            failures.remove(&ip);
            return None;
        }
        if attempts.len() < MAX_FAILED_ATTEMPTS {
            return None;
        }
        let oldest = attempts.first().copied()?;
        Some(WINDOW.saturating_sub(now.duration_since(oldest)))
    }

    pub(crate) async fn record_failure(&self, ip: IpAddr) {
        let now = Instant::now();
        let mut failures = self.failures.lock().await;
        // Drop every client whose failures all left the window.
        failures.retain(|_, attempts| {
            attempts.retain(|at| now.duration_since(*at) < WINDOW);
            !attempts.is_empty()
        });
        let attempts = failures.entry(ip).or_default();
        attempts.push(now);
        tracing::debug!(%ip, failed = attempts.len(), "login failure recorded");
    }

    /// Forget the failures of a client after it logged in.
    pub(crate) async fn reset(&self, ip: IpAddr) {
        self.failures.lock().await.remove(&ip);
    }
}
